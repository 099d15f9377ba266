//! Headless paging demo: a viewport scrolling over a catalog that answers late.

pub mod options;
pub mod remote;
pub mod viewport;

pub use options::DemoOptions;
pub use remote::{RemoteCatalog, Row};
pub use viewport::Viewport;

use lazyseq_core::{ListConfig, SparseList};
use std::rc::Rc;

/// What a finished run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoReport {
    pub frames: u32,
    pub renders: usize,
    pub pages_served: usize,
    pub rows_cached: usize,
    pub final_frame: Vec<String>,
}

/// Runs the simulation, handing every redrawn frame to `draw`.
///
/// The viewport scrolls half a screen every fourth frame. Halfway through,
/// a note is inserted below the header and the header's removal is attempted.
pub fn run(options: &DemoOptions, mut draw: impl FnMut(u32, &[String])) -> anyhow::Result<DemoReport> {
    options.validate()?;

    let catalog = Rc::new(RemoteCatalog::new(options.items, options.latency));
    let list = SparseList::<Row>::with_config(
        ListConfig::unresolved().with_fetch_window_size(options.window),
    );
    list.set_provider(Some(catalog.clone()));
    let viewport = Viewport::new(list.clone(), options.viewport);

    let step = (options.viewport / 2).max(1) as isize;
    let mut renders = 0;
    let mut final_frame = Vec::new();

    for frame in 0..options.frames {
        let answered = catalog.tick()?;
        if answered > 0 {
            log::debug!("frame {frame}: {answered} answers arrived");
        }

        if frame > 0 && frame % 4 == 0 {
            viewport.scroll_by(step);
        }

        if frame == options.frames / 2 {
            let note = Row::new(options.items, "Pinned note");
            let inserted = list.insert(1, [note]);
            log::info!("inserting a note: {inserted:?}");
            let removed = list.remove(0, 1);
            log::info!("removing the header: {removed:?}");
        }

        if viewport.is_dirty() {
            final_frame = viewport.render();
            renders += 1;
            draw(frame, &final_frame);
        }
    }

    let report = DemoReport {
        frames: options.frames,
        renders,
        pages_served: catalog.pages_served(),
        rows_cached: list.populated_count(),
        final_frame,
    };
    log::info!(
        "{} frames, {} redraws, {} pages served, {} of {} rows cached",
        report.frames,
        report.renders,
        report.pages_served,
        report.rows_cached,
        catalog.row_count()
    );
    Ok(report)
}

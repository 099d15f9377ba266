use paging_demo::viewport::PLACEHOLDER;
use paging_demo::{run, DemoOptions};

fn options() -> DemoOptions {
    DemoOptions {
        items: 40,
        window: 8,
        latency: 1,
        viewport: 5,
        frames: 30,
    }
}

#[test]
fn late_pages_fill_the_viewport() {
    let mut drawn = Vec::new();
    let report = run(&options(), |frame, lines| drawn.push((frame, lines.to_vec()))).unwrap();

    assert!(report.renders < report.frames as usize);
    assert_eq!(report.renders, drawn.len());
    assert_eq!(report.pages_served, 3);
    assert_eq!(report.rows_cached, 24);

    // The first frames wait for the length, then for the first page.
    assert!(drawn[0].1.is_empty());
    assert!(drawn[1].1.iter().all(|line| line.ends_with(PLACEHOLDER)));
    assert!(drawn[2].1.iter().all(|line| !line.ends_with(PLACEHOLDER)));

    // The note inserted halfway shifts every later row down by one.
    assert_eq!(report.final_frame.len(), 5);
    assert_eq!(report.final_frame[0], "   14  Row #0013");
    assert!(report.final_frame.iter().all(|line| !line.ends_with(PLACEHOLDER)));
}

#[test]
fn immediate_answers_never_show_placeholders() {
    let options = DemoOptions {
        latency: 0,
        ..options()
    };
    let mut placeholders = 0;
    let report = run(&options, |_, lines| {
        placeholders += lines.iter().filter(|line| line.ends_with(PLACEHOLDER)).count();
    })
    .unwrap();
    assert_eq!(placeholders, 0);
    assert_eq!(report.final_frame.len(), 5);
}

#[test]
fn invalid_options_are_reported() {
    let options = DemoOptions {
        viewport: 0,
        ..options()
    };
    let err = run(&options, |_, _| {}).unwrap_err();
    assert!(err.to_string().contains("--viewport"));
}

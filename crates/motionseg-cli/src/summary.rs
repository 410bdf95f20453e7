use console::Style;
use motionseg_core::pipeline::config::{DetectionConfig, MotionMode};
use motionseg_core::report::DetectionReport;
use motionseg_core::segment::total_frames;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    method: Style,
    disabled: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            method: Style::new().green(),
            disabled: Style::new().dim().yellow(),
        }
    }
}

fn seconds(frames: usize, fps: f64) -> Option<f64> {
    (fps > 0.0).then(|| frames as f64 / fps)
}

pub fn print_detection_summary(config: &DetectionConfig, report: &DetectionReport) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("Motion Segments"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(15)));
    println!();

    println!("  {}", s.header.apply_to("Settings"));
    println!(
        "    {:<16}{}",
        s.label.apply_to("Mode"),
        s.method.apply_to(config.motion_mode)
    );
    if config.motion_mode == MotionMode::Detail {
        println!(
            "    {:<16}{}",
            s.label.apply_to("Tile grid"),
            s.value.apply_to(config.tile_grid)
        );
    }
    println!(
        "    {:<16}{}",
        s.label.apply_to("Sensitivity"),
        s.value.apply_to(config.sensitivity)
    );
    println!(
        "    {:<16}{}",
        s.label.apply_to("Min length"),
        s.value.apply_to(format!("{} frames", config.min_segment_frames))
    );
    println!(
        "    {:<16}{}",
        s.label.apply_to("Merge gap"),
        s.value.apply_to(format!("{} frames", config.merge_gap_frames))
    );
    if config.sample_every_n > 1 {
        println!(
            "    {:<16}{}",
            s.label.apply_to("Sampling"),
            s.value.apply_to(format!("every {} frames", config.sample_every_n))
        );
    }
    println!();

    println!("  {}", s.header.apply_to("Result"));
    let frames = match seconds(report.frame_count, report.fps) {
        Some(secs) => format!("{} ({secs:.1} s @ {:.2} fps)", report.frame_count, report.fps),
        None => report.frame_count.to_string(),
    };
    println!("    {:<16}{}", s.label.apply_to("Frames"), s.value.apply_to(frames));

    if report.is_empty() {
        println!("    {}", s.disabled.apply_to("No segments found."));
        println!();
        return;
    }

    let moving = total_frames(&report.segments);
    println!(
        "    {:<16}{}",
        s.label.apply_to("Segments"),
        s.value.apply_to(report.segments.len())
    );
    println!(
        "    {:<16}{}",
        s.label.apply_to("In motion"),
        s.value.apply_to(format!("{moving} frames"))
    );
    println!();

    for (i, seg) in report.segments.iter().enumerate() {
        let span = match seconds(seg.start(), report.fps).zip(seconds(seg.end() + 1, report.fps)) {
            Some((a, b)) => format!("  {a:.2}s - {b:.2}s"),
            None => String::new(),
        };
        println!(
            "    {}. {}{}",
            s.label.apply_to(i + 1),
            s.value.apply_to(format!("{}-{} ({} frames)", seg.start(), seg.end(), seg.length())),
            s.label.apply_to(span)
        );
    }
    println!();
}

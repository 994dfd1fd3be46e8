//! Frame-rate Chart Component
//!
//! Scrolling frame-rate line drawn on an HTML5 Canvas.

use leptos::*;
use telemetry_console::FpsSeries;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::state::DashboardState;

const LINE_COLOR: &str = "#FF9800";

/// The y axis never shrinks below this, so a steady 60 fps is not drawn
/// as a full-height line
const MIN_Y_MAX: f64 = 60.0;

/// Frame-rate chart component
#[component]
pub fn FpsChart() -> impl IntoView {
    let state = use_context::<DashboardState>().expect("DashboardState not found");
    let canvas_ref = create_node_ref::<html::Canvas>();

    // Redraw whenever a sample arrives
    create_effect(move |_| {
        state.series.with(|series| {
            if let Some(canvas) = canvas_ref.get() {
                draw_chart(&canvas, series);
            }
        });
    });

    let summary = move || {
        state
            .series
            .with(|series| series.summary())
            .map(|s| format!("min {:.1} · avg {:.1} · max {:.1}", s.min, s.average, s.max))
            .unwrap_or_else(|| "No samples yet".to_string())
    };

    view! {
        <div class="relative">
            <canvas
                node_ref=canvas_ref
                width="800"
                height="300"
                class="w-full h-64 rounded-lg"
            />
            <div class="text-center text-sm text-gray-400 mt-2">{summary}</div>
        </div>
    }
}

/// Draw the series on canvas
fn draw_chart(canvas: &HtmlCanvasElement, series: &FpsSeries) {
    let ctx = match canvas.get_context("2d") {
        Ok(Some(ctx)) => match ctx.dyn_into::<CanvasRenderingContext2d>() {
            Ok(ctx) => ctx,
            Err(_) => return,
        },
        _ => return,
    };

    let width = canvas.width() as f64;
    let height = canvas.height() as f64;

    // Margins
    let margin_left = 50.0;
    let margin_right = 20.0;
    let margin_top = 20.0;
    let margin_bottom = 30.0;

    let chart_width = width - margin_left - margin_right;
    let chart_height = height - margin_top - margin_bottom;

    // Clear canvas
    ctx.set_fill_style(&"#1f2937".into()); // gray-800
    ctx.fill_rect(0.0, 0.0, width, height);

    let (Some(first), Some(last), Some(summary)) =
        (series.earliest(), series.latest(), series.summary())
    else {
        ctx.set_fill_style(&"#6b7280".into());
        ctx.set_font("16px sans-serif");
        let _ = ctx.fill_text("Waiting for frame rate", width / 2.0 - 80.0, height / 2.0);
        return;
    };

    let y_max = summary.max.max(MIN_Y_MAX) * 1.1;
    let start = first.timestamp_ms;
    // A single sample still needs a non-zero span
    let span_ms = (last.timestamp_ms - start).max(1) as f64;

    let x_of = |timestamp_ms: i64| margin_left + ((timestamp_ms - start) as f64 / span_ms) * chart_width;
    let y_of = |value: f64| margin_top + (1.0 - value / y_max) * chart_height;

    // Horizontal grid lines with labels
    ctx.set_stroke_style(&"#374151".into()); // gray-700
    ctx.set_line_width(1.0);
    ctx.set_fill_style(&"#9ca3af".into()); // gray-400
    ctx.set_font("12px sans-serif");
    for i in 0..=4 {
        let value = y_max * i as f64 / 4.0;
        let y = y_of(value);
        ctx.begin_path();
        ctx.move_to(margin_left, y);
        ctx.line_to(width - margin_right, y);
        ctx.stroke();
        let _ = ctx.fill_text(&format!("{:.0}", value), 5.0, y + 4.0);
    }

    // Series line; disconnects show up as drops to zero
    ctx.set_stroke_style(&LINE_COLOR.into());
    ctx.set_line_width(2.0);
    ctx.begin_path();
    for (i, sample) in series.iter().enumerate() {
        let (x, y) = (x_of(sample.timestamp_ms), y_of(sample.value));
        if i == 0 {
            ctx.move_to(x, y);
        } else {
            ctx.line_to(x, y);
        }
    }
    ctx.stroke();

    // Time labels at both ends
    ctx.set_fill_style(&"#9ca3af".into());
    for (timestamp, x) in [(start, margin_left), (last.timestamp_ms, width - margin_right - 50.0)] {
        let label = chrono::DateTime::from_timestamp_millis(timestamp)
            .map(|dt| dt.format("%H:%M:%S").to_string())
            .unwrap_or_default();
        let _ = ctx.fill_text(&label, x, height - 10.0);
    }
}

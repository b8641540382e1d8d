use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{FontDesc, FontFamily, FontStyle};

use super::{format_time, ChartFormat, ChartLayout, LabelPlacement};
use crate::error::{RenderError, Result};

/// Draw a laid-out chart to `path` as PNG or SVG
pub fn render_chart(layout: &ChartLayout, path: &Path, format: ChartFormat, size: (u32, u32)) -> Result<()> {
    let outcome = match format {
        ChartFormat::Png => draw_chart(BitMapBackend::new(path, size).into_drawing_area(), layout),
        ChartFormat::Svg => draw_chart(SVGBackend::new(path, size).into_drawing_area(), layout),
    };

    outcome.map_err(|e| RenderError::Backend(format!("{:#}", e)))?;

    tracing::info!(path = %path.display(), ?format, bars = layout.bars.len(), "Chart written");
    Ok(())
}

fn draw_chart<DB>(root: DrawingArea<DB, Shift>, layout: &ChartLayout) -> anyhow::Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;
    let area = root.titled(
        &layout.title,
        FontDesc::new(FontFamily::SansSerif, 28.0, FontStyle::Bold),
    )?;

    let x_ticks: Vec<f64> = layout.x_ticks.iter().copied().filter(|tick| *tick <= layout.x_max).collect();
    let x_label_count = x_ticks.len();

    let mut chart = ChartBuilder::on(&area)
        .caption(&layout.subtitle, ("sans-serif", 18))
        .margin(20)
        .set_label_area_size(LabelAreaPosition::Left, 60)
        .set_label_area_size(LabelAreaPosition::Bottom, 50)
        .build_cartesian_2d(
            (0.0..layout.x_max).with_key_points(x_ticks),
            0.0..layout.y_max,
        )?;

    chart
        .configure_mesh()
        .x_desc("Time (m:ss)")
        .y_desc("Intensity (% FTP)")
        .x_labels(x_label_count)
        .x_label_formatter(&|minutes| format_time((minutes * 60.0).round() as u32))
        .y_label_formatter(&|v| format!("{:.0}", v))
        .bold_line_style(&BLACK.mix(0.15))
        .light_line_style(&TRANSPARENT)
        .draw()?;

    // Bars
    chart.draw_series(layout.bars.iter().map(|bar| {
        let (r, g, b) = bar.zone.rgb();
        Rectangle::new(
            [(bar.x_start, 0.0), (bar.x_start + bar.width, bar.height())],
            RGBColor(r, g, b).mix(0.8).filled(),
        )
    }))?;
    chart.draw_series(layout.bars.iter().map(|bar| {
        Rectangle::new(
            [(bar.x_start, 0.0), (bar.x_start + bar.width, bar.height())],
            BLACK.stroke_width(1),
        )
    }))?;

    // Labels, two lines each
    let line_gap = layout.y_max * 0.035;
    for bar in &layout.bars {
        let (style, base_y) = match bar.placement {
            LabelPlacement::Inside => (
                FontDesc::new(FontFamily::SansSerif, 11.0, FontStyle::Bold)
                    .color(&WHITE)
                    .pos(Pos::new(HPos::Center, VPos::Center)),
                bar.height() / 2.0 + line_gap / 2.0,
            ),
            LabelPlacement::Above => (
                FontDesc::new(FontFamily::SansSerif, 11.0, FontStyle::Normal)
                    .color(&BLACK)
                    .pos(Pos::new(HPos::Center, VPos::Bottom)),
                bar.height() + line_gap * 1.5,
            ),
        };

        for (line_index, line) in bar.label.lines().enumerate() {
            let y = base_y - line_gap * line_index as f64;
            chart.draw_series(std::iter::once(Text::new(
                line.to_string(),
                (bar.x_center(), y),
                style.clone(),
            )))?;
        }
    }

    // Zone legend
    for zone in &layout.legend {
        let (r, g, b) = zone.rgb();
        let color = RGBColor(r, g, b);
        chart
            .draw_series(std::iter::empty::<Rectangle<(f64, f64)>>())?
            .label(zone.legend_label())
            .legend(move |(x, y)| Rectangle::new([(x, y - 6), (x + 14, y + 6)], color.mix(0.8).filled()));
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK.mix(0.3))
        .label_font(FontDesc::new(FontFamily::SansSerif, 14.0, FontStyle::Normal))
        .position(SeriesLabelPosition::UpperRight)
        .draw()?;

    area.present()?;
    Ok(())
}

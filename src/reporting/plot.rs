//! # Plot Rendering Module / 图形渲染模块
//!
//! Renders a [`Figure`] as a standalone SVG document with `plotters`.
//!
//! 使用 `plotters` 将 `Figure` 渲染为独立的 SVG 文档。

use plotters::prelude::*;

use crate::core::figure::Figure;

/// Page size in pixels.
pub const PAGE_SIZE: (u32, u32) = (900, 600);

const CURVE_COLORS: [RGBColor; 4] = [
    RGBColor(0, 102, 204),
    RGBColor(204, 102, 0),
    RGBColor(34, 139, 34),
    RGBColor(160, 32, 240),
];

/// Draws every curve of `figure`, clipped to its x-range, and returns the SVG text.
pub fn render_svg(figure: &Figure) -> Result<String, String> {
    let mut svg = String::new();
    draw(figure, &mut svg).map_err(|e| e.to_string())?;
    Ok(svg)
}

fn draw(figure: &Figure, out: &mut String) -> Result<(), Box<dyn std::error::Error>> {
    let (x0, x1) = figure.x_range();
    let (y0, y1) = figure.y_range();

    let root = SVGBackend::with_string(out, PAGE_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(&figure.title, ("sans-serif", 22))
        .margin(10)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d(x0..x1, y0..y1)?;

    chart
        .configure_mesh()
        .x_desc(figure.x_label.as_str())
        .y_desc(figure.y_label.as_str())
        .x_labels(9)
        .x_label_formatter(&|x| format!("{x:.0}"))
        .y_label_formatter(&|y| format!("{y:.2}"))
        .light_line_style(&WHITE)
        .draw()?;

    for (idx, curve) in figure.curves().iter().enumerate() {
        let color = CURVE_COLORS[idx % CURVE_COLORS.len()];
        chart
            .draw_series(LineSeries::new(curve.curve.clipped(x0, x1), &color))?
            .label(curve.label().to_string())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    // Reference wavelength marker.
    if let Some(reference) = figure.curves().first().map(|c| c.reference) {
        if reference >= x0 && reference <= x1 {
            chart.draw_series(std::iter::once(PathElement::new(
                vec![(reference, y0), (reference, y1)],
                BLACK.mix(0.15),
            )))?;
        }
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::curve::Curve;

    #[test]
    fn renders_svg_with_both_labels() {
        let mut fig = Figure::new("silicon_atmosphere");
        fig.add_curve(
            Curve::from_points("model", vec![(8000.0, 1.0), (10000.0, 1.28)])
                .normalize_at(8000.0)
                .unwrap(),
        );
        fig.add_curve(
            Curve::from_points("baseline", vec![(8000.0, 1.0), (10000.0, 2.0)])
                .normalize_at(8000.0)
                .unwrap(),
        );
        fig.set_x_range(2000.0, 10000.0);

        let svg = render_svg(&fig).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("model"));
        assert!(svg.contains("baseline"));
        assert!(svg.contains("silicon_atmosphere"));
    }

    #[test]
    fn segments_crossing_the_edges_reach_both_axes() {
        let mut fig = Figure::new("clipped");
        fig.add_curve(
            Curve::from_points("model", vec![(1000.0, 0.5), (8000.0, 1.0), (12000.0, 2.0)])
                .normalize_at(8000.0)
                .unwrap(),
        );
        fig.set_x_range(2000.0, 10000.0);

        let svg = render_svg(&fig).unwrap();
        let series = &svg[svg.find("stroke=\"#0066CC\"").unwrap()..];
        let points = &series[series.find("points=\"").unwrap() + "points=\"".len()..];
        let points = &points[..points.find('"').unwrap()];
        let xs: Vec<f64> = points
            .split_whitespace()
            .map(|pair| pair.split(',').next().unwrap().parse().unwrap())
            .collect();
        assert_eq!(xs.len(), 3, "polyline was {points:?}");
        // The plot area spans from the y-label area to the right margin.
        assert!(xs[0] < 100.0);
        assert!(xs[2] > 800.0);
    }

    #[test]
    fn renders_empty_figure() {
        let fig = Figure::new("empty");
        assert!(render_svg(&fig).is_ok());
    }
}

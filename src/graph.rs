use crate::dashboard::Dashboard;
use crate::record::InventoryYear;

/// Charts offered by the dashboard
///
/// Each kind maps to one bar chart built from a [`Dashboard`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChartKind {
    /// Emissions per scope bucket
    Scopes,
    /// Positive categories, largest first
    Categories,
    /// Top-N emission sources of the filtered detail table
    Sources,
    /// Total emissions per inventory year
    Years,
}

impl ChartKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "scopes" => Some(ChartKind::Scopes),
            "categories" => Some(ChartKind::Categories),
            "sources" => Some(ChartKind::Sources),
            "years" => Some(ChartKind::Years),
            _ => None,
        }
    }
}

/// Configuration options for graph generation
#[derive(Clone, Debug)]
pub struct GraphOptions {
    /// Title displayed at the top of the graph
    pub title: String,

    /// Label for the X-axis
    pub x_label: String,

    /// Label for the Y-axis
    pub y_label: String,

    /// Width of the graph in pixels
    pub width: u32,

    /// Height of the graph in pixels
    pub height: u32,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            title: "Graph".to_string(),
            x_label: String::new(),
            y_label: "Emissions (tCO2e)".to_string(),
            width: 900,
            height: 500,
        }
    }
}

impl GraphOptions {
    pub fn for_chart(kind: ChartKind) -> Self {
        let (title, x_label) = match kind {
            ChartKind::Scopes => ("Emissions by scope (tCO2e)", "Scope"),
            ChartKind::Categories => ("Emissions by category", "Category"),
            ChartKind::Sources => ("Top emission sources", "Source"),
            ChartKind::Years => ("Total emissions by year", "Year"),
        };
        GraphOptions {
            title: title.to_string(),
            x_label: x_label.to_string(),
            ..GraphOptions::default()
        }
    }
}

/// Labelled bar values for `kind`, in display order.
pub fn chart_series(kind: ChartKind, dashboard: &Dashboard) -> Vec<(String, f64)> {
    match kind {
        ChartKind::Scopes => dashboard
            .scope_totals
            .iter()
            .map(|t| (t.label.clone(), t.emissions_tco2e))
            .collect(),
        ChartKind::Categories => dashboard
            .category_chart
            .iter()
            .map(|r| (r.category.clone(), r.emissions_tco2e))
            .collect(),
        ChartKind::Sources => dashboard
            .top_sources
            .iter()
            .map(|s| (s.source.clone(), s.emissions_tco2e))
            .collect(),
        ChartKind::Years => match &dashboard.comparison {
            Some(rows) => rows
                .iter()
                .map(|r| (year_axis_label(r.year.as_ref()), r.emissions_tco2e))
                .collect(),
            None => vec![(year_axis_label(dashboard.year.as_ref()), dashboard.total_emissions_tco2e)],
        },
    }
}

fn year_axis_label(year: Option<&InventoryYear>) -> String {
    year.map(|y| y.to_string()).unwrap_or_else(|| "?".to_string())
}

/// Creates a bar graph from labelled values
///
/// Renders into an in-memory RGB buffer and encodes it as PNG, so no
/// temporary files are involved.
///
/// # Arguments
/// * `series` - (label, value) pairs, one bar each
/// * `options` - Graph styling options
///
/// # Returns
/// * A Result containing the PNG image data as bytes or an error
#[cfg(feature = "web")]
pub fn create_bar_graph(
    series: &[(String, f64)],
    options: &GraphOptions,
) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    use plotters::prelude::*;

    let (width, height) = (options.width, options.height);
    let mut pixels = vec![0u8; (width as usize) * (height as usize) * 3];
    {
        let root = BitMapBackend::with_buffer(&mut pixels, (width, height)).into_drawing_area();
        root.fill(&WHITE)?;

        let max_y = series.iter().map(|(_, v)| *v).fold(0.0f64, f64::max);
        let y_top = if max_y > 0.0 { max_y * 1.1 } else { 1.0 };
        let labels: Vec<&str> = series.iter().map(|(label, _)| label.as_str()).collect();

        let mut chart = ChartBuilder::on(&root)
            .caption(&options.title, ("sans-serif", 26).into_font())
            .margin(15)
            .x_label_area_size(60)
            .y_label_area_size(70)
            .build_cartesian_2d((0..series.len().max(1)).into_segmented(), 0.0..y_top)?;

        let label_formatter = |value: &SegmentValue<usize>| match value {
            SegmentValue::CenterOf(i) => labels.get(*i).map(|s| shorten(s)).unwrap_or_default(),
            _ => String::new(),
        };

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(series.len().max(1))
            .x_label_formatter(&label_formatter)
            .x_desc(&options.x_label)
            .y_desc(&options.y_label)
            .draw()?;

        chart.draw_series(series.iter().enumerate().map(|(i, (_, value))| {
            let color = Palette99::pick(i).filled();
            let mut bar = Rectangle::new(
                [(SegmentValue::Exact(i), 0.0), (SegmentValue::Exact(i + 1), *value)],
                color,
            );
            bar.set_margin(0, 0, 8, 8);
            bar
        }))?;

        root.present()?;
    }

    let image = image::RgbImage::from_raw(width, height, pixels)
        .ok_or("graph buffer does not match its dimensions")?;
    let mut png = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(image).write_to(&mut png, image::ImageOutputFormat::Png)?;
    Ok(png.into_inner())
}

/// Creates the chart `kind` for a dashboard as PNG bytes.
#[cfg(feature = "web")]
pub fn create_graph(kind: ChartKind, dashboard: &Dashboard) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    create_bar_graph(&chart_series(kind, dashboard), &GraphOptions::for_chart(kind))
}

// Long category names would overlap on the axis
#[cfg(feature = "web")]
fn shorten(label: &str) -> String {
    const MAX: usize = 18;
    if label.chars().count() <= MAX {
        label.to_string()
    } else {
        let head: String = label.chars().take(MAX - 1).collect();
        format!("{}…", head)
    }
}

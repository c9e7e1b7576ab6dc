//! Integration tests for figure composition, saving and regeneration.

use sky::grid::{Grid, GridData};
use sky::models::{AnalyticModel1d, AnalyticModel2d, DemoConfig};
use sky::plotlib::{
    build_figure, create_plots, regenerate, HistPlot, LegendPosition, LinePlot, PlotData, PlotItem,
    PlotOptions, Plotter, SaveFormat, Scale, Style, SubplotLayout,
};

fn figure_json(subplots: &[Vec<PlotItem>], options: &PlotOptions) -> serde_json::Value {
    let plot = build_figure(subplots, options, &Style::default()).unwrap();
    serde_json::from_str(&plot.to_json()).unwrap()
}

// ---------------------------------------------------------------------------
// Composition
// ---------------------------------------------------------------------------

#[test]
fn demo_models_share_one_figure() {
    let config = DemoConfig::default();
    let line = AnalyticModel1d::new(&config).plot(&config.samples());
    let contour = AnalyticModel2d::new()
        .plot(&[0.0, 1.0, 2.0], &[0.0, 1.0])
        .unwrap();

    let figure = figure_json(
        &[vec![line.into()], vec![contour.into()]],
        &PlotOptions::default(),
    );
    let data = figure["data"].as_array().unwrap();
    assert_eq!(data.len(), 3);
    assert_eq!(data[2]["type"], "contour");
    assert_eq!(data[2]["xaxis"], "x2");
    assert_eq!(figure["layout"]["xaxis"]["title"]["text"], "x");
    assert_eq!(figure["layout"]["yaxis"]["title"]["text"], "pressure");
}

#[test]
fn mismatched_grid_is_rejected() {
    let hist: PlotItem = HistPlot::new(vec![1.0, 2.0, 2.5]).into();
    let options = PlotOptions {
        layout: SubplotLayout::Grid { rows: 2, cols: 2 },
        ..PlotOptions::default()
    };
    let plotter = Plotter::new(tempfile::tempdir().unwrap().path());
    let err = plotter.plot(&[vec![hist]], &options).unwrap_err();
    assert!(err.to_string().contains("not matching"));
}

#[test]
fn multicolumn_layout_gives_wide_last_row() {
    let hist = || -> Vec<PlotItem> { vec![HistPlot::new(vec![1.0, 2.0]).into()] };
    let options = PlotOptions {
        layout: SubplotLayout::MultiColumn {
            regular: 2,
            wide_rows: 1,
            grid: None,
        },
        ..PlotOptions::default()
    };
    let figure = figure_json(&[hist(), hist(), hist()], &options);
    let domain = figure["layout"]["xaxis3"]["domain"].as_array().unwrap();
    assert_eq!(domain[0].as_f64(), Some(0.0));
    assert!((domain[1].as_f64().unwrap() - 1.0).abs() < 1e-9);
}

#[test]
fn grid_data_plots_pick_variant_by_dimension() {
    let grid = Grid::from_vecs(vec![vec![0.0, 1.0], vec![0.0, 1.0, 2.0]]).unwrap();
    let data = GridData::from_vec(grid, vec![0.0; 6], "u").unwrap();
    let plots = create_plots(&data, &[0]).unwrap();
    assert!(matches!(plots[0], PlotItem::Contour(_)));
}

// ---------------------------------------------------------------------------
// Axis decoration and line style
// ---------------------------------------------------------------------------

fn assert_close(value: &serde_json::Value, expected: f64) {
    let actual = value.as_f64().unwrap();
    assert!((actual - expected).abs() < 1e-9, "{} != {}", actual, expected);
}

#[test]
fn log_limits_are_given_in_decades() {
    let mut line = LinePlot::new(vec![10.0, 100.0, 1000.0], vec![1.0, 5.0, 50.0]);
    line.axes.x_scale = Scale::Log;
    line.axes.x_lim = [Some(10.0), None];
    line.axes.y_scale = Scale::Log;
    line.axes.y_lim = [Some(1.0), Some(100.0)];

    let figure = figure_json(&[vec![line.into()]], &PlotOptions::default());
    let layout = &figure["layout"];
    assert_eq!(layout["xaxis"]["type"], "log");
    assert_eq!(layout["yaxis"]["type"], "log");
    assert_close(&layout["xaxis"]["range"][0], 1.0);
    assert_close(&layout["xaxis"]["range"][1], 3.0);
    assert_close(&layout["yaxis"]["range"][0], 0.0);
    assert_close(&layout["yaxis"]["range"][1], 2.0);
}

#[test]
fn hidden_ticks_and_labels_leave_axis_bare() {
    let mut line = LinePlot::new(vec![0.0, 1.0], vec![0.0, 1.0]);
    line.axes.draw_x_ticks = false;
    line.axes.draw_y_label = false;

    let figure = figure_json(&[vec![line.into()]], &PlotOptions::default());
    let layout = &figure["layout"];
    assert_eq!(layout["xaxis"]["showticklabels"], false);
    assert_eq!(layout["yaxis"]["showticklabels"], true);
    assert_eq!(layout["xaxis"]["title"]["text"], "x");
    assert!(layout["yaxis"].get("title").is_none());
}

#[test]
fn equal_axes_anchor_y_scale_to_own_x() {
    let plain = LinePlot::new(vec![0.0, 1.0], vec![0.0, 1.0]);
    let mut square = LinePlot::new(vec![0.0, 2.0], vec![0.0, 1.0]);
    square.axes.axis_equal = true;

    let figure = figure_json(&[vec![plain.into()], vec![square.into()]], &PlotOptions::default());
    let layout = &figure["layout"];
    assert!(layout["yaxis"].get("scaleanchor").is_none());
    assert_eq!(layout["yaxis2"]["scaleanchor"], "x2");
    assert_eq!(layout["yaxis2"]["anchor"], "x2");
}

#[test]
fn subplot_title_is_centred_paper_annotation() {
    let mut line = LinePlot::new(vec![0.0, 1.0], vec![0.0, 1.0]);
    line.axes.title = "panel a".to_string();

    let figure = figure_json(&[vec![line.into()]], &PlotOptions::default());
    let annotations = figure["layout"]["annotations"].as_array().unwrap();
    assert_eq!(annotations.len(), 1);
    assert_eq!(annotations[0]["text"], "panel a");
    assert_eq!(annotations[0]["xref"], "paper");
    assert_close(&annotations[0]["x"], 0.5);
    assert_close(&annotations[0]["y"], 1.0);
}

#[test]
fn legend_position_places_legend() {
    let mut line = LinePlot::new(vec![0.0, 1.0], vec![0.0, 1.0]).with_legend("measured");
    line.axes.legend_position = LegendPosition::UpperLeft;

    let figure = figure_json(&[vec![line.into()]], &PlotOptions::default());
    let layout = &figure["layout"];
    assert_eq!(layout["showlegend"], true);
    assert_close(&layout["legend"]["x"], 0.01);
    assert_close(&layout["legend"]["y"], 0.99);
    assert_eq!(layout["legend"]["xanchor"], "left");
    assert_eq!(layout["legend"]["yanchor"], "top");
    assert_eq!(figure["data"][0]["name"], "measured");
}

#[test]
fn line_width_follows_style_unless_set() {
    let style = Style {
        line_width: 3.5,
        ..Style::default()
    };
    let default_width = LinePlot::new(vec![0.0, 1.0], vec![0.0, 1.0]);
    let fixed_width = LinePlot {
        line_width: Some(1.0),
        ..LinePlot::new(vec![0.0, 1.0], vec![1.0, 0.0])
    };

    let plot = build_figure(
        &[vec![default_width.into(), fixed_width.into()]],
        &PlotOptions::default(),
        &style,
    )
    .unwrap();
    let figure: serde_json::Value = serde_json::from_str(&plot.to_json()).unwrap();
    assert_close(&figure["data"][0]["line"]["width"], 3.5);
    assert_close(&figure["data"][1]["line"]["width"], 1.0);
}

// ---------------------------------------------------------------------------
// Saving and regeneration
// ---------------------------------------------------------------------------

#[test]
fn json_figure_saved_with_plot_data() {
    let dir = tempfile::tempdir().unwrap();
    let plotter = Plotter {
        save_format: SaveFormat::Json,
        ..Plotter::new(dir.path())
    };
    let hist: PlotItem = HistPlot::new(vec![1.0, 2.0, 2.5]).into();
    let saved = plotter
        .plot(&[vec![hist]], &PlotOptions::named("hist"))
        .unwrap()
        .unwrap();
    assert_eq!(saved.extension().unwrap(), "json");

    let figure: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&saved).unwrap()).unwrap();
    assert_eq!(figure["data"][0]["type"], "histogram");

    let stem = saved.file_stem().unwrap().to_string_lossy().into_owned();
    let data_path = dir.path().join(format!("data_{}.json", stem));
    let data = PlotData::load(&data_path).unwrap();
    assert_eq!(data.save_format, SaveFormat::Json);

    let regenerated = regenerate(&data_path, Some(SaveFormat::Html)).unwrap();
    assert_eq!(regenerated.extension().unwrap(), "html");
    assert!(regenerated.exists());
    // regeneration does not write plot data again
    let regen_dir = regenerated.parent().unwrap();
    assert_eq!(std::fs::read_dir(regen_dir).unwrap().count(), 1);
}

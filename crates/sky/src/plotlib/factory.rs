use crate::error::{GridError, PlotError};
use crate::grid::{Grid, GridData};
use crate::plotlib::{ContourPlot, LinePlot, PlotItem};

fn sample_values(data: &GridData, sample: usize) -> Result<Vec<f64>, PlotError> {
    data.sample(sample)
        .map(|column| column.to_vec())
        .ok_or(PlotError::SampleOutOfRange {
            sample,
            n_samples: data.n_samples(),
        })
}

/// One plot per sample: line plots over 1-D domains, contour plots with a
/// colour bar over 2-D domains.
pub fn create_plots(data: &GridData, samples: &[usize]) -> Result<Vec<PlotItem>, PlotError> {
    let domain = &data.domain;
    let mut plots = Vec::with_capacity(samples.len());

    for &sample in samples {
        let values = sample_values(data, sample)?;
        let plot = match domain.n_dim() {
            1 => {
                let mut line = LinePlot::new(domain.nodes().column(0).to_vec(), values);
                line.axes.y_label = data.label.clone();
                PlotItem::from(line)
            }
            2 => {
                let mut contour = ContourPlot::new(domain.clone(), values)?;
                contour.cbar = true;
                contour.cbar_label = data.label.clone();
                PlotItem::from(contour)
            }
            n => return Err(GridError::UnsupportedDimension(n).into()),
        };
        plots.push(plot);
    }
    Ok(plots)
}

/// `"<label> = <value>; ..."` for one node of a parameter grid.
pub fn parameter_label(input: &Grid, node: usize) -> Result<String, PlotError> {
    if node >= input.size() {
        return Err(GridError::NodeOutOfRange {
            node,
            size: input.size(),
        }
        .into());
    }
    let nodes = input.nodes();
    Ok(input
        .labels()
        .iter()
        .enumerate()
        .map(|(dim, label)| format!("{} = {:.2}", label, nodes[[node, dim]]))
        .collect::<Vec<_>>()
        .join("; "))
}

/// Like [`create_plots`] for outputs computed over a parameter grid: sample
/// `i` belongs to node `i` of `input`, whose values name the legend (1-D) or
/// title (2-D).
pub fn create_scalar_para_plots(input: &Grid, output: &GridData, samples: &[usize]) -> Result<Vec<PlotItem>, PlotError> {
    let mut plots = create_plots(output, samples)?;
    for (plot, &sample) in plots.iter_mut().zip(samples) {
        let label = parameter_label(input, sample)?;
        match plot {
            PlotItem::Line(line) => {
                if let Some(curve) = line.curves.first_mut() {
                    curve.legend = Some(label);
                }
            }
            other => other.axes_style_mut().title = label,
        }
    }
    Ok(plots)
}

use anyhow::{Context, Result, ensure};
use std::{f64::consts::PI, path::PathBuf};

use crate::aggregate::{aggregate, average_by_group, co_occurrence, count_by_group, ratios};
use crate::cli::{GlobalArgs, OccurrenceArgs, PrescriberInput, SpecialtyArgs, StatesArgs};
use crate::constants::{
    DEFAULT_GRAPH_FILE, DEFAULT_INPUT_FILE, FULL_TOOLS, GROUP_PALETTE, HOVER_TOOLS,
    OCCURRENCE_ALPHA_SCALE, OCCURRENCE_COUNTS_CSV, OCCURRENCE_HEATMAP_JSON, OCCURRENCE_TITLE,
    OUT_OF_GROUP_COLOR, RATE_PALETTE, SPECIALTY_COUNTS_CSV, SPECIALTY_HEATMAP_JSON,
    SPECIALTY_SHARES_CSV, SPECIALTY_TITLE, STATE_MAP_JSON, STATE_RATES_CSV, STATES_TITLE,
    TOTAL_COLUMN,
};
use crate::dataset::{Dataset, LoadOptions};
use crate::graph::{Graph, Node};
use crate::output::{write_json, write_matrix_csv, write_rates_csv};
use crate::regions::{
    builtin_regions, drop_non_contiguous, join_rates, load_boundaries, undeclared_codes,
};
use crate::series::{
    ChoroplethRequest, ColorMapper, DisplayConfig, HeatmapRequest, HeatmapSeries, Orientation,
    alpha,
};

fn tooltips(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(label, field)| (label.to_string(), field.to_string()))
        .collect()
}

fn load_options(input: &PrescriberInput, group_column: &str) -> LoadOptions {
    let mut opts = LoadOptions::default();
    if !input.exclude_columns.is_empty() {
        opts.text_columns = input.exclude_columns.clone();
    }
    if !input.indicator_columns.is_empty() {
        opts.indicator_columns = input.indicator_columns.clone();
    }
    if !opts.text_columns.iter().any(|c| c == group_column) {
        opts.text_columns.push(group_column.to_string());
    }
    if !opts.required_columns.iter().any(|c| c == group_column) {
        opts.required_columns.push(group_column.to_string());
    }
    opts
}

fn load_prescribers(
    global: &GlobalArgs,
    input: &PrescriberInput,
    group_column: &str,
) -> Result<Dataset> {
    let input_path = input
        .input_path
        .clone()
        .unwrap_or_else(|| global.data_dir.join(DEFAULT_INPUT_FILE));
    tracing::info!("Reading prescribers from {}", input_path.display());
    let dataset = Dataset::from_path(&input_path, &load_options(input, group_column))
        .with_context(|| format!("Failed loading prescriber CSV {}", input_path.display()))?;
    if dataset.is_empty() {
        tracing::warn!("{} has a header but no records", input_path.display());
    }
    Ok(dataset)
}

pub fn run_specialty(global: &GlobalArgs, cmd: &SpecialtyArgs) -> Result<()> {
    let dataset = load_prescribers(global, &cmd.input, &cmd.group_by)?;
    let metrics = dataset.metric_columns();
    ensure!(
        !metrics.is_empty(),
        "No drug columns left after excluding non-metric columns"
    );

    let counts = aggregate(&dataset, &cmd.group_by, &metrics)
        .with_context(|| format!("Failed aggregating by {}", cmd.group_by))?;
    let shares = ratios(&counts);
    let prescriptions: f64 = counts.column_sums().iter().sum();
    tracing::info!(
        "Aggregated {} records ({} prescriptions) into {} {} groups x {} drugs",
        dataset.len(),
        prescriptions,
        counts.rows(),
        cmd.group_by,
        counts.columns()
    );

    let output_dir = global.output_dir();
    let counts_csv = output_dir.join(SPECIALTY_COUNTS_CSV);
    let shares_csv = output_dir.join(SPECIALTY_SHARES_CSV);
    let heatmap_json = output_dir.join(SPECIALTY_HEATMAP_JSON);

    write_matrix_csv(&counts, &cmd.group_by, &counts_csv)?;
    tracing::info!("Wrote {}", counts_csv.display());
    write_matrix_csv(&shares, &cmd.group_by, &shares_csv)?;
    tracing::info!("Wrote {}", shares_csv.display());

    let opacity = shares.cells().iter().map(|&share| alpha(share)).collect();
    let series = HeatmapSeries::from_matrix(&counts, Orientation::RowsOnY).with_opacity(opacity)?;
    if series.is_empty() {
        tracing::warn!("Heatmap has no cells; the input produced no {} groups", cmd.group_by);
    }
    let request = HeatmapRequest {
        display: DisplayConfig {
            title: SPECIALTY_TITLE.to_string(),
            width: 1600,
            height: 800,
            tools: FULL_TOOLS.to_string(),
            x_axis_location: Some("above".to_string()),
            label_font_size: Some("4pt".to_string()),
            x_label_orientation: Some(PI / 3.0),
            tooltips: tooltips(&[
                (cmd.group_by.as_str(), "@y_categories"),
                ("Drug", "@x_categories"),
                ("Number of Prescriptions", "@values"),
            ]),
        },
        x_range: counts.column_labels().to_vec(),
        y_range: counts.row_labels().to_vec(),
        series,
    };
    write_json(&request, &heatmap_json)?;
    tracing::info!(
        "Wrote {} ({} cells)",
        heatmap_json.display(),
        request.series.len()
    );
    Ok(())
}

pub fn run_states(global: &GlobalArgs, cmd: &StatesArgs) -> Result<()> {
    let dataset = load_prescribers(global, &cmd.input, &cmd.state_column)?;
    let metrics = dataset.metric_columns();
    let dataset = dataset
        .with_row_total(TOTAL_COLUMN, &metrics)
        .context("Failed deriving per-provider prescription totals")?;

    let averages = average_by_group(&dataset, &cmd.state_column, TOTAL_COLUMN)
        .with_context(|| format!("Failed averaging by {}", cmd.state_column))?;
    let providers = count_by_group(&dataset, &cmd.state_column)
        .with_context(|| format!("Failed counting by {}", cmd.state_column))?;

    let regions = match &cmd.boundaries {
        Some(path) => load_boundaries(path)?,
        None => builtin_regions(),
    };
    let regions = if cmd.include_noncontiguous {
        regions
    } else {
        drop_non_contiguous(regions)
    };

    let undeclared = undeclared_codes(&regions, &averages);
    if !undeclared.is_empty() {
        tracing::warn!(
            "{} state codes have records but are not on the map: {}",
            undeclared.len(),
            undeclared.join(",")
        );
    }

    let rates = join_rates(&regions, &averages, &providers);
    let without_data: Vec<&str> = rates
        .iter()
        .filter(|r| r.rate.is_none())
        .map(|r| r.code.as_str())
        .collect();
    if !without_data.is_empty() {
        tracing::info!(
            "{} mapped regions have no records and are left uncoloured: {}",
            without_data.len(),
            without_data.join(",")
        );
    }

    let output_dir = global.output_dir();
    let rates_csv = output_dir.join(STATE_RATES_CSV);
    let map_json = output_dir.join(STATE_MAP_JSON);

    write_rates_csv(&rates, &rates_csv)?;
    tracing::info!("Wrote {}", rates_csv.display());

    let display = DisplayConfig {
        title: STATES_TITLE.to_string(),
        width: 1100,
        height: 700,
        tools: FULL_TOOLS.to_string(),
        x_axis_location: None,
        label_font_size: None,
        x_label_orientation: None,
        tooltips: tooltips(&[
            ("Name", "@region_names"),
            ("Avg. prescriptions per doctor", "@rates"),
            ("(Long, Lat)", "($x, $y)"),
        ]),
    };
    let color_mapper = ColorMapper {
        kind: "log".to_string(),
        palette: RATE_PALETTE.iter().map(|c| c.to_string()).collect(),
    };
    let request = ChoroplethRequest::new(display, color_mapper, &regions, &rates)?;
    write_json(&request, &map_json)?;
    tracing::info!("Wrote {} ({} regions)", map_json.display(), regions.len());
    Ok(())
}

/// Palette colour when both nodes share a group, grey otherwise; node pairs in
/// row-major order.
fn occurrence_colors(nodes: &[Node]) -> Vec<String> {
    let mut colors = Vec::with_capacity(nodes.len() * nodes.len());
    for a in nodes {
        for b in nodes {
            let color = if a.group == b.group {
                GROUP_PALETTE[a.group % GROUP_PALETTE.len()]
            } else {
                OUT_OF_GROUP_COLOR
            };
            colors.push(color.to_string());
        }
    }
    colors
}

pub fn run_occurrence(global: &GlobalArgs, cmd: &OccurrenceArgs) -> Result<()> {
    let graph_path: PathBuf = cmd
        .graph
        .clone()
        .unwrap_or_else(|| global.data_dir.join(DEFAULT_GRAPH_FILE));
    let graph = Graph::from_path(&graph_path)?;

    let names = graph.node_names();
    let counts = co_occurrence(&graph.links, graph.nodes.len())
        .with_context(|| format!("Invalid links in {}", graph_path.display()))?
        .relabel(names.clone(), names)
        .context("Node names do not match co-occurrence matrix size")?;

    let output_dir = global.output_dir();
    let counts_csv = output_dir.join(OCCURRENCE_COUNTS_CSV);
    let heatmap_json = output_dir.join(OCCURRENCE_HEATMAP_JSON);

    write_matrix_csv(&counts, "node", &counts_csv)?;
    tracing::info!("Wrote {}", counts_csv.display());

    let opacity = counts
        .cells()
        .iter()
        .map(|&count| alpha(count / OCCURRENCE_ALPHA_SCALE))
        .collect();
    let series = HeatmapSeries::from_matrix(&counts, Orientation::RowsOnX)
        .with_opacity(opacity)?
        .with_colors(occurrence_colors(&graph.nodes))?;

    let y_range = graph.names_by_group();
    let x_range = y_range.iter().rev().cloned().collect();
    let request = HeatmapRequest {
        display: DisplayConfig {
            title: OCCURRENCE_TITLE.to_string(),
            width: 800,
            height: 800,
            tools: HOVER_TOOLS.to_string(),
            x_axis_location: Some("above".to_string()),
            label_font_size: Some("5pt".to_string()),
            x_label_orientation: Some(PI / 3.0),
            tooltips: tooltips(&[
                ("names", "@y_categories, @x_categories"),
                ("count", "@values"),
            ]),
        },
        x_range,
        y_range,
        series,
    };
    write_json(&request, &heatmap_json)?;
    tracing::info!(
        "Wrote {} ({} cells)",
        heatmap_json.display(),
        request.series.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use std::{fs, path::Path};

    const PRESCRIBERS: &str = "\
NPI,Gender,State,Credentials,Specialty,ABILIFY,LYRICA,ZOLOFT,Opioid.Prescriber
1,M,CA,MD,Dentist,3,0,1,1
2,F,CA,DDS,Dentist,2,1,0,0
3,F,NY,MD,Urology,0,5,0,1
4,M,HI,MD,Urology,0,0,0,0
5,M,GU,MD,Urology,1,1,1,0
";

    fn global(dir: &Path) -> GlobalArgs {
        GlobalArgs {
            data_dir: dir.to_path_buf(),
            output_dir: None,
            verbose: false,
        }
    }

    fn input() -> PrescriberInput {
        PrescriberInput {
            input_path: None,
            exclude_columns: Vec::new(),
            indicator_columns: Vec::new(),
        }
    }

    fn read_json(path: &Path) -> Value {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn specialty_writes_aligned_heatmap() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(DEFAULT_INPUT_FILE), PRESCRIBERS).unwrap();
        let cmd = SpecialtyArgs {
            input: input(),
            group_by: "Specialty".to_string(),
        };
        run_specialty(&global(dir.path()), &cmd).unwrap();

        let out = dir.path().join("output");
        let counts = fs::read_to_string(out.join(SPECIALTY_COUNTS_CSV)).unwrap();
        assert_eq!(
            counts,
            "Specialty,ABILIFY,LYRICA,ZOLOFT\nDentist,5,1,1\nUrology,1,6,1\n"
        );

        let json = read_json(&out.join(SPECIALTY_HEATMAP_JSON));
        let xs = json["x_categories"].as_array().unwrap();
        let ys = json["y_categories"].as_array().unwrap();
        let values = json["values"].as_array().unwrap();
        let opacity = json["opacity"].as_array().unwrap();
        assert_eq!(xs.len(), 6);
        assert_eq!(ys.len(), 6);
        assert_eq!(values.len(), 6);
        assert_eq!(opacity.len(), 6);
        assert_eq!(xs[1], "LYRICA");
        assert_eq!(ys[1], "Dentist");
        assert_eq!(values[1], 1.0);
        assert_eq!(json["y_range"], serde_json::json!(["Dentist", "Urology"]));
        assert_eq!(json["display"]["width"], 1600);
        assert!(out.join(SPECIALTY_SHARES_CSV).exists());
    }

    #[test]
    fn specialty_fails_on_malformed_input() {
        let dir = tempfile::tempdir().unwrap();
        let bad = "NPI,State,Specialty,ABILIFY\n1,CA,Dentist,x\n";
        fs::write(dir.path().join(DEFAULT_INPUT_FILE), bad).unwrap();
        let cmd = SpecialtyArgs {
            input: input(),
            group_by: "Specialty".to_string(),
        };
        let err = run_specialty(&global(dir.path()), &cmd).unwrap_err();
        assert!(format!("{err:#}").contains("non-numeric value 'x'"));
        assert!(!dir.path().join("output").join(SPECIALTY_COUNTS_CSV).exists());
    }

    #[test]
    fn specialty_groups_by_any_text_column() {
        let dir = tempfile::tempdir().unwrap();
        let prescribers = "\
NPI,State,Specialty,Region,ABILIFY,ZOLOFT
1,CA,Dentist,West,3,1
2,NY,Dentist,East,2,0
3,OR,Urology,West,1,4
";
        fs::write(dir.path().join(DEFAULT_INPUT_FILE), prescribers).unwrap();
        let cmd = SpecialtyArgs {
            input: input(),
            group_by: "Region".to_string(),
        };
        run_specialty(&global(dir.path()), &cmd).unwrap();
        let counts =
            fs::read_to_string(dir.path().join("output").join(SPECIALTY_COUNTS_CSV)).unwrap();
        assert_eq!(counts, "Region,ABILIFY,ZOLOFT\nEast,2,0\nWest,4,5\n");
    }

    #[test]
    fn states_reads_a_renamed_state_column() {
        let dir = tempfile::tempdir().unwrap();
        let prescribers = "NPI,State,Specialty,Practice.State,ABILIFY\n1,CA,Dentist,NY,3\n";
        fs::write(dir.path().join(DEFAULT_INPUT_FILE), prescribers).unwrap();
        let cmd = StatesArgs {
            input: input(),
            state_column: "Practice.State".to_string(),
            boundaries: None,
            include_noncontiguous: false,
        };
        run_states(&global(dir.path()), &cmd).unwrap();
        let rates =
            fs::read_to_string(dir.path().join("output").join(STATE_RATES_CSV)).unwrap();
        assert_eq!(rates, "state,name,providers,rate\nNY,New York,1,3\n");
    }

    #[test]
    fn custom_exclusions_change_the_metric_set() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(DEFAULT_INPUT_FILE), PRESCRIBERS).unwrap();
        let mut prescribers = input();
        prescribers.exclude_columns = ["NPI", "Gender", "State", "Credentials", "Specialty", "LYRICA"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let cmd = SpecialtyArgs {
            input: prescribers,
            group_by: "Specialty".to_string(),
        };
        run_specialty(&global(dir.path()), &cmd).unwrap();
        let counts =
            fs::read_to_string(dir.path().join("output").join(SPECIALTY_COUNTS_CSV)).unwrap();
        assert!(counts.starts_with("Specialty,ABILIFY,ZOLOFT\n"));
    }

    #[test]
    fn states_averages_declared_regions() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(DEFAULT_INPUT_FILE), PRESCRIBERS).unwrap();
        let cmd = StatesArgs {
            input: input(),
            state_column: "State".to_string(),
            boundaries: None,
            include_noncontiguous: false,
        };
        run_states(&global(dir.path()), &cmd).unwrap();

        let out = dir.path().join("output");
        let rates = fs::read_to_string(out.join(STATE_RATES_CSV)).unwrap();
        assert_eq!(
            rates,
            "state,name,providers,rate\nCA,California,2,3.5\nNY,New York,1,5\n"
        );

        let json = read_json(&out.join(STATE_MAP_JSON));
        let codes = json["region_codes"].as_array().unwrap();
        let values = json["rates"].as_array().unwrap();
        assert_eq!(codes.len(), 49);
        assert_eq!(values.len(), 49);
        assert!(!codes.iter().any(|c| c == "HI"));
        let wy = codes.iter().position(|c| c == "WY").unwrap();
        assert!(values[wy].is_null());
        assert_eq!(json["color_mapper"]["kind"], "log");
    }

    #[test]
    fn states_keeps_noncontiguous_on_request() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(DEFAULT_INPUT_FILE), PRESCRIBERS).unwrap();
        let cmd = StatesArgs {
            input: input(),
            state_column: "State".to_string(),
            boundaries: None,
            include_noncontiguous: true,
        };
        run_states(&global(dir.path()), &cmd).unwrap();
        let rates =
            fs::read_to_string(dir.path().join("output").join(STATE_RATES_CSV)).unwrap();
        assert!(rates.contains("HI,Hawaii,1,0\n"));
    }

    #[test]
    fn occurrence_writes_symmetric_counts_and_group_colors() {
        let dir = tempfile::tempdir().unwrap();
        let graph = r#"{
            "nodes": [
                {"name": "Myriel", "group": 1},
                {"name": "Napoleon", "group": 1},
                {"name": "Valjean", "group": 2}
            ],
            "links": [
                {"source": 1, "target": 0, "value": 1},
                {"source": 2, "target": 0, "value": 8}
            ]
        }"#;
        fs::write(dir.path().join(DEFAULT_GRAPH_FILE), graph).unwrap();
        run_occurrence(&global(dir.path()), &OccurrenceArgs { graph: None }).unwrap();

        let out = dir.path().join("output");
        let counts = fs::read_to_string(out.join(OCCURRENCE_COUNTS_CSV)).unwrap();
        assert_eq!(
            counts,
            "node,Myriel,Napoleon,Valjean\nMyriel,0,1,8\nNapoleon,1,0,0\nValjean,8,0,0\n"
        );

        let json = read_json(&out.join(OCCURRENCE_HEATMAP_JSON));
        let colors = json["colors"].as_array().unwrap();
        assert_eq!(colors.len(), 9);
        assert_eq!(colors[1], GROUP_PALETTE[1]);
        assert_eq!(colors[2], OUT_OF_GROUP_COLOR);
        assert_eq!(colors[8], GROUP_PALETTE[2]);
        assert_eq!(json["x_categories"][2], "Myriel");
        assert_eq!(json["y_categories"][2], "Valjean");
        assert_eq!(json["values"][2], 8.0);
        assert_eq!(
            json["x_range"],
            serde_json::json!(["Valjean", "Napoleon", "Myriel"])
        );
        let opacity = json["opacity"].as_array().unwrap();
        assert_eq!(opacity[2], 1.0);
        assert_eq!(opacity[0], 0.1);
    }

    #[test]
    fn occurrence_rejects_links_to_missing_nodes() {
        let dir = tempfile::tempdir().unwrap();
        let graph = r#"{"nodes": [{"name": "a"}], "links": [{"source": 0, "target": 4, "value": 1}]}"#;
        let path = dir.path().join("links.json");
        fs::write(&path, graph).unwrap();
        let cmd = OccurrenceArgs { graph: Some(path) };
        let err = run_occurrence(&global(dir.path()), &cmd).unwrap_err();
        assert!(format!("{err:#}").contains("outside 0..1"));
    }

    #[test]
    fn group_colors_wrap_the_palette() {
        let nodes = vec![
            Node {
                name: "a".to_string(),
                group: GROUP_PALETTE.len() + 3,
            },
            Node {
                name: "b".to_string(),
                group: 0,
            },
        ];
        let colors = occurrence_colors(&nodes);
        assert_eq!(colors[0], GROUP_PALETTE[3]);
        assert_eq!(colors[1], OUT_OF_GROUP_COLOR);
        assert_eq!(colors[3], GROUP_PALETTE[0]);
    }
}

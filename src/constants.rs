pub const DEFAULT_INPUT_FILE: &str = "prescriber-info.csv";
pub const DEFAULT_GRAPH_FILE: &str = "graph.json";

pub const ID_COLUMN: &str = "NPI";
pub const STATE_COLUMN: &str = "State";
pub const SPECIALTY_COLUMN: &str = "Specialty";

/// Columns every prescriber file must carry.
pub const REQUIRED_COLUMNS: &[&str] = &[ID_COLUMN, STATE_COLUMN, SPECIALTY_COLUMN];

/// Non-metric columns kept as text.
pub const DEFAULT_TEXT_COLUMNS: &[&str] = &["NPI", "Gender", "State", "Credentials", "Specialty"];

/// Non-metric 0/1 columns.
pub const DEFAULT_INDICATOR_COLUMNS: &[&str] = &["Opioid.Prescriber"];

/// Name of the per-record sum over every drug column.
pub const TOTAL_COLUMN: &str = "Total";

pub const SPECIALTY_COUNTS_CSV: &str = "specialty_drug_counts.csv";
pub const SPECIALTY_SHARES_CSV: &str = "specialty_drug_shares.csv";
pub const SPECIALTY_HEATMAP_JSON: &str = "specialty_drug_heatmap.json";
pub const STATE_RATES_CSV: &str = "state_prescription_rates.csv";
pub const STATE_MAP_JSON: &str = "state_prescription_map.json";
pub const OCCURRENCE_COUNTS_CSV: &str = "co_occurrence_counts.csv";
pub const OCCURRENCE_HEATMAP_JSON: &str = "co_occurrence_heatmap.json";

pub const SPECIALTY_TITLE: &str = "2014 Medicare Drug Prescriptions by Specialty";
pub const STATES_TITLE: &str = "2014 Medicare Drug Prescription Rates";
pub const OCCURRENCE_TITLE: &str = "Les Mis Occurrences";

pub const FULL_TOOLS: &str = "pan,wheel_zoom,box_zoom,reset,hover,save";
pub const HOVER_TOOLS: &str = "hover,save";

/// Opacity floor and cap used when turning weights into alpha values.
pub const ALPHA_FLOOR: f64 = 0.1;
pub const ALPHA_CAP: f64 = 0.9;
/// Link weight that saturates the co-occurrence alpha.
pub const OCCURRENCE_ALPHA_SCALE: f64 = 4.0;

pub const OUT_OF_GROUP_COLOR: &str = "lightgrey";

pub const GROUP_PALETTE: &[&str] = &[
    "#444444", "#a6cee3", "#1f78b4", "#b2df8a", "#33a02c", "#fb9a99", "#e31a1c", "#fdbf6f",
    "#ff7f00", "#cab2d6", "#6a3d9a",
];

/// Inferno6 reversed, so low rates are light.
pub const RATE_PALETTE: &[&str] = &[
    "#FCFEA4", "#FBA40A", "#DC5039", "#932567", "#410967", "#000003",
];

/// Regions dropped from the map unless explicitly requested.
pub const NON_CONTIGUOUS_STATES: &[&str] = &["AK", "HI"];

/// Declared regions used when no boundary file is supplied.
pub const US_STATES: &[(&str, &str)] = &[
    ("AK", "Alaska"),
    ("AL", "Alabama"),
    ("AR", "Arkansas"),
    ("AZ", "Arizona"),
    ("CA", "California"),
    ("CO", "Colorado"),
    ("CT", "Connecticut"),
    ("DC", "District of Columbia"),
    ("DE", "Delaware"),
    ("FL", "Florida"),
    ("GA", "Georgia"),
    ("HI", "Hawaii"),
    ("IA", "Iowa"),
    ("ID", "Idaho"),
    ("IL", "Illinois"),
    ("IN", "Indiana"),
    ("KS", "Kansas"),
    ("KY", "Kentucky"),
    ("LA", "Louisiana"),
    ("MA", "Massachusetts"),
    ("MD", "Maryland"),
    ("ME", "Maine"),
    ("MI", "Michigan"),
    ("MN", "Minnesota"),
    ("MO", "Missouri"),
    ("MS", "Mississippi"),
    ("MT", "Montana"),
    ("NC", "North Carolina"),
    ("ND", "North Dakota"),
    ("NE", "Nebraska"),
    ("NH", "New Hampshire"),
    ("NJ", "New Jersey"),
    ("NM", "New Mexico"),
    ("NV", "Nevada"),
    ("NY", "New York"),
    ("OH", "Ohio"),
    ("OK", "Oklahoma"),
    ("OR", "Oregon"),
    ("PA", "Pennsylvania"),
    ("RI", "Rhode Island"),
    ("SC", "South Carolina"),
    ("SD", "South Dakota"),
    ("TN", "Tennessee"),
    ("TX", "Texas"),
    ("UT", "Utah"),
    ("VA", "Virginia"),
    ("VT", "Vermont"),
    ("WA", "Washington"),
    ("WI", "Wisconsin"),
    ("WV", "West Virginia"),
    ("WY", "Wyoming"),
];

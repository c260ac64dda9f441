// Data models
use chrono::NaiveDateTime;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct Experiment {
    pub id: i64,
    pub title: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub experiment_type: Option<i64>,
    pub finished: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataPoint {
    pub id: i64,
    pub real_value: Option<f64>,
    pub target_value: Option<f64>,
    pub experiment_id: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Subject {
    pub id: i64,
    pub gdpr_accepted: bool,
}

/// Experiment to insert. `finished` left as `None` takes the column default.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExperiment {
    pub title: String,
    pub experiment_type: i64,
    pub finished: Option<bool>,
}

impl NewExperiment {
    pub fn new(title: impl Into<String>, experiment_type: i64) -> Self {
        Self {
            title: title.into(),
            experiment_type,
            finished: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewDataPoint {
    pub real_value: f64,
    pub target_value: f64,
}

/// Subject to insert. `gdpr_accepted` left as `None` takes the column default.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NewSubject {
    pub gdpr_accepted: Option<bool>,
}

impl NewSubject {
    pub fn with_consent(gdpr_accepted: bool) -> Self {
        Self {
            gdpr_accepted: Some(gdpr_accepted),
        }
    }
}

fn flag(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

fn optional_float(value: Option<f64>) -> String {
    value.map_or_else(|| "None".to_string(), |v| format!("{:?}", v))
}

impl fmt::Display for Experiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Experiment(id={}, title='{}', finished={})",
            self.id,
            self.title.as_deref().unwrap_or(""),
            flag(self.finished)
        )
    }
}

impl fmt::Display for DataPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DataPoint(id={}, real_value={}, target_value={}, experiment_id={})",
            self.id,
            optional_float(self.real_value),
            optional_float(self.target_value),
            self.experiment_id
        )
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Subject(id={}, gdpr_accepted={})", self.id, flag(self.gdpr_accepted))
    }
}

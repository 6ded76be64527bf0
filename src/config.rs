use crate::geodesy::NM_TO_METER;
use crate::record::RecordSchema;
use crate::search::DEFAULT_MAX_RANGE_NM;

/// Tunables shared by every query of a dispatcher.
#[derive(Clone, Debug, Builder)]
#[builder(setter(into))]
pub struct QueryConfig {
    /// Search radius for proximity queries.
    #[builder(default = "DEFAULT_MAX_RANGE_NM")]
    pub max_range_nm: f64,
    #[builder(default)]
    pub schema: RecordSchema,
}

impl QueryConfig {
    pub fn max_range_m(&self) -> f64 {
        self.max_range_nm * NM_TO_METER
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        QueryConfig {
            max_range_nm: DEFAULT_MAX_RANGE_NM,
            schema: RecordSchema::default(),
        }
    }
}

//! JSON configuration of algorithms and graph generation.
//!
//! # Algorithm Suite
//!
//! ```json
//! {
//!   "ACO":   { "pheDecay": 0.1, "threshold": 0.4, "epochs": 100, "ants": 5 },
//!   "AntQ":  { "gamma": 0.2, "W": 0.5 },
//!   "ACOLS": { "localSearchIters": 20 },
//!   "SAO":   { "minTemp": 1, "maxTemp": 13, "reductionRule": "boltzmann" },
//!   "BnB":   { "baseline": "greedy" },
//!   "Greedy": {},
//!   "Random": { "randomState": 42 }
//! }
//! ```
//!
//! Missing parameters keep the algorithm defaults. `baseline` selects the
//! seeding algorithm (`"random"`, the default, or `"greedy"`).
//!
//! # Graph Generation
//!
//! ```json
//! { "nVertices": [10, 40], "density": [0.1, 0.3], "weights": [1, 100] }
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, ScheduleError};
use crate::models::Weight;
use crate::optimizer::{
    AntColony, AntQ, BaselineKind, BranchAndBound, GreedyScheduler, Optimizer, RandomScheduler,
    ReductionRule, SimulatedAnnealing, SumiAco, DEFAULT_SEED,
};
use crate::pool::{DagGenerator, Density};

/// Algorithm selector, keyed by the names used in suite files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AlgorithmKind {
    #[serde(rename = "ACO")]
    AntColony,
    #[serde(rename = "AntQ")]
    AntQ,
    #[serde(rename = "ACOLS", alias = "SUMIACO")]
    SumiAco,
    #[serde(rename = "SAO")]
    SimulatedAnnealing,
    #[serde(rename = "BnB")]
    BranchAndBound,
    Greedy,
    Random,
}

impl AlgorithmKind {
    /// Key used in suite files and result labels.
    pub fn key(&self) -> &'static str {
        match self {
            AlgorithmKind::AntColony => "ACO",
            AlgorithmKind::AntQ => "AntQ",
            AlgorithmKind::SumiAco => "ACOLS",
            AlgorithmKind::SimulatedAnnealing => "SAO",
            AlgorithmKind::BranchAndBound => "BnB",
            AlgorithmKind::Greedy => "Greedy",
            AlgorithmKind::Random => "Random",
        }
    }
}

impl fmt::Display for AlgorithmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for AlgorithmKind {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ACO" => Ok(AlgorithmKind::AntColony),
            "AntQ" => Ok(AlgorithmKind::AntQ),
            "ACOLS" | "SUMIACO" => Ok(AlgorithmKind::SumiAco),
            "SAO" => Ok(AlgorithmKind::SimulatedAnnealing),
            "BnB" => Ok(AlgorithmKind::BranchAndBound),
            "Greedy" => Ok(AlgorithmKind::Greedy),
            "Random" => Ok(AlgorithmKind::Random),
            other => Err(ScheduleError::UnknownAlgorithm(other.to_string())),
        }
    }
}

/// One configured algorithm: kind, baseline and parameter overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmConfig {
    pub kind: AlgorithmKind,
    #[serde(default)]
    pub baseline: BaselineKind,
    #[serde(default)]
    pub parameters: BTreeMap<String, f64>,
}

impl AlgorithmConfig {
    pub fn new(kind: AlgorithmKind) -> Self {
        Self {
            kind,
            baseline: BaselineKind::default(),
            parameters: BTreeMap::new(),
        }
    }

    pub fn with_baseline(mut self, baseline: BaselineKind) -> Self {
        self.baseline = baseline;
        self
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: f64) -> Self {
        self.parameters.insert(key.into(), value);
        self
    }

    /// Builds a fresh optimizer with a fresh baseline and applies the
    /// parameters.
    ///
    /// # Errors
    /// Whatever the optimizer's parameter setter rejects.
    pub fn build(&self) -> Result<Box<dyn Optimizer>> {
        let mut optimizer = self.instantiate();
        optimizer.set_parameters(&self.parameters)?;
        Ok(optimizer)
    }

    /// Builds with `overrides` applied on top of the configured parameters.
    pub fn build_with(&self, overrides: &BTreeMap<String, f64>) -> Result<Box<dyn Optimizer>> {
        let mut optimizer = self.build()?;
        optimizer.set_parameters(overrides)?;
        Ok(optimizer)
    }

    fn instantiate(&self) -> Box<dyn Optimizer> {
        let baseline = self.baseline.build();
        match self.kind {
            AlgorithmKind::AntColony => Box::new(AntColony::new(baseline)),
            AlgorithmKind::AntQ => Box::new(AntQ::new(baseline)),
            AlgorithmKind::SumiAco => Box::new(SumiAco::new(baseline)),
            AlgorithmKind::SimulatedAnnealing => Box::new(SimulatedAnnealing::new(baseline)),
            AlgorithmKind::BranchAndBound => Box::new(BranchAndBound::new(baseline)),
            AlgorithmKind::Greedy => Box::new(GreedyScheduler::new()),
            AlgorithmKind::Random => Box::new(RandomScheduler::new()),
        }
    }
}

/// A set of algorithms loaded from one suite file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuiteConfig {
    pub algorithms: Vec<AlgorithmConfig>,
}

impl SuiteConfig {
    /// Parses the suite format (algorithm key to parameter object).
    ///
    /// # Errors
    /// - [`ScheduleError::Json`] for malformed JSON
    /// - [`ScheduleError::UnknownAlgorithm`] for an unsupported key
    /// - [`ScheduleError::UnknownReductionRule`] for a bad `reductionRule`
    /// - [`ScheduleError::InvalidParameter`] for non-numeric values
    pub fn from_json(text: &str) -> Result<Self> {
        let raw: BTreeMap<String, BTreeMap<String, Value>> = serde_json::from_str(text)?;
        let algorithms = raw
            .into_iter()
            .map(|(key, fields)| parse_algorithm(&key, fields))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { algorithms })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// Builds every configured optimizer.
    pub fn build_all(&self) -> Result<Vec<Box<dyn Optimizer>>> {
        self.algorithms.iter().map(AlgorithmConfig::build).collect()
    }

    /// Configuration for `kind`, if present.
    pub fn get(&self, kind: AlgorithmKind) -> Option<&AlgorithmConfig> {
        self.algorithms.iter().find(|a| a.kind == kind)
    }
}

fn not_a_number(name: &str) -> ScheduleError {
    ScheduleError::invalid_parameter(name, f64::NAN, "must be a number")
}

fn parse_algorithm(key: &str, fields: BTreeMap<String, Value>) -> Result<AlgorithmConfig> {
    let mut config = AlgorithmConfig::new(key.parse()?);
    for (name, value) in fields {
        let parsed = match (name.as_str(), value) {
            ("baseline", Value::String(s)) => {
                config.baseline = match s.to_ascii_lowercase().as_str() {
                    "greedy" => BaselineKind::Greedy,
                    "random" => BaselineKind::Random { seed: DEFAULT_SEED },
                    _ => return Err(ScheduleError::UnknownAlgorithm(s)),
                };
                continue;
            }
            ("reductionRule", Value::String(s)) => f64::from(s.parse::<ReductionRule>()?.index()),
            (_, Value::Number(n)) => n.as_f64().ok_or_else(|| not_a_number(&name))?,
            _ => return Err(not_a_number(&name)),
        };
        config.parameters.insert(name, parsed);
    }
    Ok(config)
}

/// Random graph generation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphConfig {
    /// Inclusive vertex count range.
    pub n_vertices: (usize, usize),
    pub density: Density,
    /// Inclusive weight range of non-sink vertices.
    pub weights: (Weight, Weight),
}

impl GraphConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// A generator of `samples` graphs with these parameters.
    pub fn generator(&self, samples: usize, batch_size: usize, seed: u64) -> Result<DagGenerator> {
        DagGenerator::new(
            self.n_vertices,
            self.density.clone(),
            self.weights,
            samples,
            batch_size,
            seed,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::DagPool;

    const SUITE: &str = r#"{
        "ACO": { "pheDecay": 0.2, "epochs": 3, "ants": 2 },
        "SUMIACO": { "localSearchIters": 4, "epochs": 2 },
        "SAO": { "reductionRule": "couchy", "maxTemp": 6, "baseline": "greedy" },
        "Greedy": {}
    }"#;

    #[test]
    fn test_parse_suite() {
        let suite = SuiteConfig::from_json(SUITE).unwrap();
        assert_eq!(suite.algorithms.len(), 4);

        let aco = suite.get(AlgorithmKind::AntColony).unwrap();
        assert_eq!(aco.parameters["pheDecay"], 0.2);
        assert_eq!(aco.baseline, BaselineKind::default());

        let sa = suite.get(AlgorithmKind::SimulatedAnnealing).unwrap();
        assert_eq!(sa.parameters["reductionRule"], 1.0);
        assert_eq!(sa.baseline, BaselineKind::Greedy);

        assert!(suite.get(AlgorithmKind::SumiAco).is_some());
        assert!(suite.get(AlgorithmKind::BranchAndBound).is_none());
    }

    #[test]
    fn test_build_all() {
        let suite = SuiteConfig::from_json(SUITE).unwrap();
        let optimizers = suite.build_all().unwrap();
        let mut names: Vec<_> = optimizers.iter().map(|o| o.name()).collect();
        names.sort_unstable();
        assert_eq!(names, vec!["ACO", "ACOLS", "Greedy", "SAO"]);
    }

    #[test]
    fn test_unknown_algorithm() {
        let err = SuiteConfig::from_json(r#"{ "Tabu": {} }"#).unwrap_err();
        assert!(matches!(err, ScheduleError::UnknownAlgorithm(k) if k == "Tabu"));
    }

    #[test]
    fn test_unknown_reduction_rule() {
        let err = SuiteConfig::from_json(r#"{ "SAO": { "reductionRule": "linear" } }"#).unwrap_err();
        assert!(matches!(err, ScheduleError::UnknownReductionRule(_)));
    }

    #[test]
    fn test_non_numeric_parameter() {
        let err = SuiteConfig::from_json(r#"{ "ACO": { "ants": "many" } }"#).unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidParameter { .. }));
    }

    #[test]
    fn test_bad_parameter_surfaces_at_build() {
        let suite = SuiteConfig::from_json(r#"{ "ACO": { "gamma": 0.3 } }"#).unwrap();
        assert!(matches!(
            suite.build_all(),
            Err(ScheduleError::UnknownParameter(_))
        ));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            SuiteConfig::from_json("{ not json"),
            Err(ScheduleError::Json(_))
        ));
    }

    #[test]
    fn test_kind_round_trip() {
        for kind in [
            AlgorithmKind::AntColony,
            AlgorithmKind::AntQ,
            AlgorithmKind::SumiAco,
            AlgorithmKind::SimulatedAnnealing,
            AlgorithmKind::BranchAndBound,
            AlgorithmKind::Greedy,
            AlgorithmKind::Random,
        ] {
            assert_eq!(kind.key().parse::<AlgorithmKind>().unwrap(), kind);
            assert_eq!(kind.to_string(), kind.key());
            let optimizer = AlgorithmConfig::new(kind).build().unwrap();
            assert_eq!(optimizer.name(), kind.key());
        }
    }

    #[test]
    fn test_algorithm_config_serde() {
        let config = AlgorithmConfig::new(AlgorithmKind::AntQ)
            .with_baseline(BaselineKind::Greedy)
            .with_parameter("gamma", 0.4);
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains(r#""kind":"AntQ""#));
        let back: AlgorithmConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_graph_config() {
        let config = GraphConfig::from_json(
            r#"{ "nVertices": [5, 9], "density": [0.1, 0.3], "weights": [1, 50] }"#,
        )
        .unwrap();
        assert_eq!(config.n_vertices, (5, 9));
        assert_eq!(config.density, Density::Choices(vec![0.1, 0.3]));

        let mut generator = config.generator(3, 3, 1).unwrap();
        let mut batch = Vec::new();
        assert_eq!(generator.next_batch(&mut batch).unwrap(), 3);
    }

    #[test]
    fn test_graph_config_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graphs.json");
        fs::write(
            &path,
            r#"{ "nVertices": [3, 3], "density": {"min": 0.0, "max": 1.0}, "weights": [2, 2] }"#,
        )
        .unwrap();
        let config = GraphConfig::from_path(&path).unwrap();
        assert_eq!(config.density, Density::Range { min: 0.0, max: 1.0 });
    }
}

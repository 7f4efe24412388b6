//! Model evaluation.

use crate::error::ForecastError;
use crate::features::FeatureVector;
use crate::model::{LinearParams, ModelArtifact, ModelSpec};

/// Evaluates one model family against a feature map.
///
/// Implementations receive their family's parameters already selected by
/// [`predict`].
pub trait Predictor {
    type Params;

    /// Non-negative whole-unit demand estimate.
    fn evaluate(
        &self,
        features: &FeatureVector,
        feature_names: &[String],
        params: &Self::Params,
    ) -> Result<u64, ForecastError>;
}

/// `intercept + Σ coefficients[i] * scaled(features[model.features[i]])`,
/// rounded and floored at zero.
#[derive(Debug, Default, Copy, Clone)]
pub struct LinearPredictor;

impl LinearPredictor {
    /// Unrounded linear response.
    ///
    /// Shape is checked before any arithmetic: coefficients must be present
    /// and match `feature_names` one-to-one. Features missing from the vector
    /// read as 0.
    pub fn raw(
        &self,
        features: &FeatureVector,
        feature_names: &[String],
        params: &LinearParams,
    ) -> Result<f64, ForecastError> {
        if params.coefficients.is_empty() {
            return Err(ForecastError::invalid_artifact(
                "linear model has no coefficients",
            ));
        }
        if params.coefficients.len() != feature_names.len() {
            return Err(ForecastError::invalid_artifact(format!(
                "coefficients ({}) and features ({}) differ in length",
                params.coefficients.len(),
                feature_names.len()
            )));
        }

        let mut prediction = params.intercept;
        let weighted = feature_names.iter().zip(&params.coefficients);
        for (i, (name, coefficient)) in weighted.enumerate() {
            let x = features.value(name);
            let x = match &params.scaler {
                Some(scaler) => scaler.scale(i, x)?,
                None => x,
            };
            prediction += coefficient * x;
        }
        Ok(prediction)
    }
}

impl Predictor for LinearPredictor {
    type Params = LinearParams;

    fn evaluate(
        &self,
        features: &FeatureVector,
        feature_names: &[String],
        params: &LinearParams,
    ) -> Result<u64, ForecastError> {
        self.raw(features, feature_names, params).map(to_demand)
    }
}

/// Route an artifact to the evaluator for its family.
///
/// Families without an evaluator fail closed; nothing falls back to linear.
pub fn predict(features: &FeatureVector, model: &ModelArtifact) -> Result<u64, ForecastError> {
    match &model.spec {
        ModelSpec::LinearRegression(params) => {
            LinearPredictor.evaluate(features, &model.features, params)
        }
        ModelSpec::RandomForest
        | ModelSpec::Xgboost
        | ModelSpec::Lstm
        | ModelSpec::Prophet
        | ModelSpec::Arima
        | ModelSpec::Other => Err(ForecastError::UnsupportedModelType(model.model_type())),
    }
}

/// `max(0, round(x))` as a unit count. NaN maps to 0.
fn to_demand(x: f64) -> u64 {
    x.round().max(0.0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ModelType, Scaler};
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;

    fn names(ns: &[&str]) -> Vec<String> {
        ns.iter().map(|s| s.to_string()).collect()
    }

    fn linear(features: &[&str], coefficients: Vec<f64>, intercept: f64) -> ModelArtifact {
        ModelArtifact {
            model_name: "uniform_forecast".into(),
            version: "1".into(),
            features: names(features),
            spec: ModelSpec::LinearRegression(LinearParams {
                coefficients,
                intercept,
                scaler: None,
            }),
            accuracy: Default::default(),
            training_date: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn weighted_sum_with_intercept() {
        let model = linear(&["a", "b"], vec![2.0, -1.0], 5.0);
        let fv = FeatureVector::new().with("a", 3.0).with("b", 4.0);
        assert_eq!(predict(&fv, &model).unwrap(), 7);
    }

    #[test]
    fn missing_features_default_to_zero() {
        let model = linear(&["a", "b", "c"], vec![2.0, -1.0, 10.0], 5.0);
        let fv = FeatureVector::new().with("a", 3.0).with("b", 4.0);
        assert_eq!(predict(&fv, &model).unwrap(), 7);
    }

    #[test]
    fn negative_predictions_floor_at_zero() {
        let model = linear(&["a"], vec![-3.0], 1.0);
        let fv = FeatureVector::new().with("a", 10.0);
        assert_eq!(predict(&fv, &model).unwrap(), 0);
    }

    #[test]
    fn rounds_to_nearest_unit() {
        let model = linear(&["a"], vec![1.0], 0.0);
        assert_eq!(predict(&FeatureVector::new().with("a", 2.5), &model).unwrap(), 3);
        assert_eq!(predict(&FeatureVector::new().with("a", 2.49), &model).unwrap(), 2);
    }

    #[test]
    fn length_mismatch_is_invalid_artifact() {
        let model = linear(&["a", "b"], vec![1.0, 2.0, 3.0], 0.0);
        let err = predict(&FeatureVector::new(), &model).unwrap_err();
        assert!(matches!(err, ForecastError::InvalidModelArtifact(_)));
    }

    #[test]
    fn empty_coefficients_are_invalid_artifact() {
        let model = linear(&[], vec![], 4.0);
        let err = predict(&FeatureVector::new(), &model).unwrap_err();
        assert!(matches!(err, ForecastError::InvalidModelArtifact(_)));
    }

    #[test]
    fn standard_scaling_by_model_feature_index() {
        let mut model = linear(&["b", "a"], vec![1.0, 1.0], 0.0);
        if let ModelSpec::LinearRegression(p) = &mut model.spec {
            p.scaler = Some(Scaler::Standard {
                mean: vec![10.0, 0.0],
                std: vec![2.0, 0.0],
            });
        }
        // b: (14 - 10) / 2 = 2; a: std 0 → 0.
        let fv = FeatureVector::new().with("a", 99.0).with("b", 14.0);
        assert_eq!(predict(&fv, &model).unwrap(), 2);
    }

    #[test]
    fn minmax_scaling() {
        let mut model = linear(&["a"], vec![10.0], 0.0);
        if let ModelSpec::LinearRegression(p) = &mut model.spec {
            p.scaler = Some(Scaler::MinMax {
                min: vec![0.0],
                max: vec![4.0],
            });
        }
        let fv = FeatureVector::new().with("a", 3.0);
        let ModelSpec::LinearRegression(params) = &model.spec else {
            panic!("expected linear spec");
        };
        assert_eq!(LinearPredictor.raw(&fv, &model.features, params).unwrap(), 7.5);
        assert_eq!(predict(&fv, &model).unwrap(), 8);
    }

    #[test]
    fn linear_evaluator_takes_its_params_directly() {
        let params = LinearParams {
            coefficients: vec![2.0],
            intercept: 1.0,
            scaler: None,
        };
        let fv = FeatureVector::new().with("a", 3.0);
        assert_eq!(LinearPredictor.evaluate(&fv, &names(&["a"]), &params).unwrap(), 7);
    }

    #[test]
    fn other_families_fail_closed() {
        let mut model = linear(&["a"], vec![1.0], 0.0);
        model.spec = ModelSpec::RandomForest;
        let err = predict(&FeatureVector::new().with("a", 1.0), &model).unwrap_err();
        assert!(matches!(
            err,
            ForecastError::UnsupportedModelType(ModelType::RandomForest)
        ));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        #[test]
        fn zero_coefficients_yield_clamped_intercept(
            intercept in -1_000.0f64..1_000.0,
            values in prop::collection::vec(-1e6f64..1e6, 1..8),
        ) {
            let feature_names: Vec<String> =
                (0..values.len()).map(|i| format!("f{i}")).collect();
            let refs: Vec<&str> = feature_names.iter().map(|s| s.as_str()).collect();
            let model = linear(&refs, vec![0.0; values.len()], intercept);
            let fv: FeatureVector = feature_names.iter().cloned().zip(values).collect();
            prop_assert_eq!(predict(&fv, &model).unwrap(), intercept.round().max(0.0) as u64);
        }
    }
}

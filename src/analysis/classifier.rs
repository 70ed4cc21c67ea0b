use crate::types::anomaly::{AnomalyBand, Classification};

/// Flags observations falling outside their historical band.
pub struct AnomalyClassifier;

impl AnomalyClassifier {
    /// `Anomalous` iff a band exists and `observed` lies strictly outside `[low, high]`.
    ///
    /// Without a band there is no history to compare against, so the result is `Normal`.
    ///
    /// # Examples
    ///
    /// ```
    /// use climate_analyzer::{AnomalyBand, AnomalyClassifier, Classification};
    ///
    /// let band = AnomalyBand::from_samples(&[20.0, 22.0, 24.0]);
    /// assert_eq!(AnomalyClassifier::classify(26.0, band.as_ref()), Classification::Anomalous);
    /// assert_eq!(AnomalyClassifier::classify(24.0, band.as_ref()), Classification::Normal);
    /// assert_eq!(AnomalyClassifier::classify(99.0, None), Classification::Normal);
    /// ```
    pub fn classify(observed_temperature: f64, band: Option<&AnomalyBand>) -> Classification {
        match band {
            Some(band) if observed_temperature < band.low || observed_temperature > band.high => {
                Classification::Anomalous
            }
            _ => Classification::Normal,
        }
    }
}

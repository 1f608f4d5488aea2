//! Montage resolution: crossing physical leads into display channels.

use ndarray::Array2;

use crate::error::{Result, XdfError};
use crate::filter::BandPass;
use crate::types::MontageChannel;

/// Computes the crossed signal for a montage channel.
///
/// With a single lead the montage signal is that lead's matrix unchanged
/// (no differencing); with both leads it is `lead_1 - lead_2` element-wise.
///
/// # Errors
///
/// * [`XdfError::ShapeMismatch`] - the two lead matrices decode to
///   different epoch/sample counts.
/// * [`XdfError::MalformedSource`] - the montage defines no leads at all.
pub fn cross(
    montage: &MontageChannel,
    lead_1: Option<&Array2<i64>>,
    lead_2: Option<&Array2<i64>>,
) -> Result<Array2<f64>> {
    match (lead_1, lead_2) {
        (Some(first), None) => Ok(first.mapv(|v| v as f64)),
        (None, Some(second)) => Ok(second.mapv(|v| v as f64)),
        (Some(first), Some(second)) => {
            if first.dim() != second.dim() {
                return Err(XdfError::ShapeMismatch {
                    montage: montage.label.clone(),
                    lhs: first.dim(),
                    rhs: second.dim(),
                });
            }
            Ok(first.mapv(|v| v as f64) - second.mapv(|v| v as f64))
        }
        (None, None) => Err(XdfError::MalformedSource {
            name: montage.label.clone(),
            detail: "montage defines no leads".to_string(),
        }),
    }
}

/// Crosses the leads and applies the montage's band-pass filter.
///
/// `sample_frequency` is the governing lead's rate (lead 1 when both are
/// present) and sets the Nyquist frequency for the filter design.
pub fn resolve(
    montage: &MontageChannel,
    lead_1: Option<&Array2<i64>>,
    lead_2: Option<&Array2<i64>>,
    sample_frequency: u32,
    order: usize,
) -> Result<Array2<f64>> {
    let crossed = cross(montage, lead_1, lead_2)?;
    let filter = BandPass::design(
        montage.low_cut,
        montage.high_cut,
        sample_frequency as f64,
        order,
    )?;
    Ok(filter.filter_matrix(&crossed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn montage(lead_1: Option<&str>, lead_2: Option<&str>) -> MontageChannel {
        MontageChannel {
            label: "C3-A2".to_string(),
            lead_1: lead_1.map(str::to_string),
            lead_2: lead_2.map(str::to_string),
            low_cut: 0.3,
            high_cut: 35.0,
        }
    }

    #[test]
    fn single_lead_passes_through() {
        let lead = array![[1i64, -2, 3], [4, 5, -6]];
        let crossed = cross(&montage(Some("C3"), None), Some(&lead), None).unwrap();
        assert_eq!(crossed, lead.mapv(|v| v as f64));
    }

    #[test]
    fn both_leads_are_differenced() {
        let first = array![[10i64, 20], [30, 40]];
        let second = array![[1i64, 2], [3, 4]];
        let crossed =
            cross(&montage(Some("C3"), Some("A2")), Some(&first), Some(&second)).unwrap();
        assert_eq!(crossed, array![[9.0, 18.0], [27.0, 36.0]]);
    }

    #[test]
    fn shape_mismatch_is_rejected() {
        let first = array![[1i64, 2, 3]];
        let second = array![[1i64, 2]];
        let err = cross(&montage(Some("C3"), Some("A2")), Some(&first), Some(&second))
            .unwrap_err();
        assert!(matches!(err, XdfError::ShapeMismatch { .. }));
    }

    #[test]
    fn leadless_montage_is_rejected() {
        let err = cross(&montage(None, None), None, None).unwrap_err();
        assert!(matches!(err, XdfError::MalformedSource { .. }));
    }
}

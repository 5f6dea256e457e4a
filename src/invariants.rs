//! Stress and strain invariants of the six-component output rows.
//!
//! Rows follow the driver's component order `11, 22, 33, 12, 13, 23` with tension
//! positive. Stress shear components are tensor components, strain shear components
//! are engineering shear strains (twice the tensor component), so the two deviatoric
//! norms weight the shear terms differently.

use nalgebra::Vector6;
use serde::{Deserialize, Serialize};

/// Six stress or strain components in driver order.
pub type Voigt = Vector6<f64>;

/// Sign convention used when presenting mean stress and volumetric strain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignConvention {
    /// Compression reported as positive, the usual soil mechanics convention.
    #[default]
    CompressionPositive,
    /// Raw driver convention, tension positive.
    TensionPositive,
}

impl SignConvention {
    /// Factor that converts a raw (tension positive) value into this convention.
    #[must_use]
    pub const fn factor(self) -> f64 {
        match self {
            SignConvention::CompressionPositive => -1.0,
            SignConvention::TensionPositive => 1.0,
        }
    }

    /// Express the raw value `value` in this convention.
    #[must_use]
    pub fn apply(self, value: f64) -> f64 {
        self.factor() * value
    }
}

/// Deviatoric part of a row: the normal components minus a third of `trace`.
fn deviator(components: &Voigt, trace: f64) -> Voigt {
    let mean = trace / 3.0;
    let mut deviator = *components;
    for axis in 0..3 {
        deviator[axis] -= mean;
    }
    deviator
}

/// Sum of the squared normal components plus `shear_weight` times the squared shears.
fn weighted_norm_squared(components: &Voigt, shear_weight: f64) -> f64 {
    let normal: f64 = components.fixed_rows::<3>(0).norm_squared();
    let shear: f64 = components.fixed_rows::<3>(3).norm_squared();
    normal + shear_weight * shear
}

/// Mean stress `p = (s11 + s22 + s33) / 3`, tension positive.
#[must_use]
pub fn mean_stress(stress: &Voigt) -> f64 {
    (stress[0] + stress[1] + stress[2]) / 3.0
}

/// Deviatoric stress invariant `q = sqrt(3/2 S:S)`.
///
/// # Examples
/// ```
/// use incdriver::invariants::{deviatoric_stress, Voigt};
///
/// let triaxial = Voigt::new(10.0, 20.0, 10.0, 0.0, 0.0, 0.0);
/// assert!((deviatoric_stress(&triaxial) - 10.0).abs() < 1e-12);
/// ```
#[must_use]
pub fn deviatoric_stress(stress: &Voigt) -> f64 {
    let trace = stress[0] + stress[1] + stress[2];
    let deviator = deviator(stress, trace);
    (1.5 * weighted_norm_squared(&deviator, 2.0)).sqrt()
}

/// Volumetric strain `ev = e11 + e22 + e33`, tension positive.
#[must_use]
pub fn volumetric_strain(strain: &Voigt) -> f64 {
    strain[0] + strain[1] + strain[2]
}

/// Deviatoric strain invariant `eq = sqrt(2/3 e:e)` with engineering shear strains.
#[must_use]
pub fn deviatoric_strain(strain: &Voigt) -> f64 {
    let deviator = deviator(strain, volumetric_strain(strain));
    (2.0 / 3.0 * weighted_norm_squared(&deviator, 0.5)).sqrt()
}

/// Mean and deviatoric stress of one row.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct StressInvariants {
    /// Mean stress in the requested sign convention.
    pub p: f64,
    /// Deviatoric stress, always non-negative.
    pub q: f64,
}

impl StressInvariants {
    /// Compute the invariants of `stress` and express `p` in `convention`.
    #[must_use]
    pub fn new(stress: &Voigt, convention: SignConvention) -> Self {
        Self {
            p: convention.apply(mean_stress(stress)),
            q: deviatoric_stress(stress),
        }
    }
}

/// Volumetric and deviatoric strain of one row.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct StrainInvariants {
    /// Volumetric strain in the requested sign convention.
    pub volumetric: f64,
    /// Deviatoric strain, always non-negative.
    pub deviatoric: f64,
}

impl StrainInvariants {
    /// Compute the invariants of `strain` and express the volumetric part in `convention`.
    #[must_use]
    pub fn new(strain: &Voigt, convention: SignConvention) -> Self {
        Self {
            volumetric: convention.apply(volumetric_strain(strain)),
            deviatoric: deviatoric_strain(strain),
        }
    }
}

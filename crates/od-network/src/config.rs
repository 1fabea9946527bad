//! Load-time configuration.

/// Options for [`crate::NetworkBuilder`].
#[derive(Clone, Debug, PartialEq)]
pub struct NetworkConfig {
    /// Turn lane-level dangling links (a lane id missing on an existing
    /// road) into [`crate::LoadError::DanglingLane`] instead of a warning
    /// and an unresolved link.
    pub strict_links: bool,

    /// Reject a road whose plan view length differs from its authored length
    /// with [`crate::LoadError::LengthMismatch`] instead of a warning.
    pub strict_geometry: bool,

    /// Gap between a lane's end point and its linked lane's entry point above
    /// which a debug line is logged after linking.
    pub continuity_tolerance_m: f64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            strict_links: false,
            strict_geometry: false,
            continuity_tolerance_m: 0.05,
        }
    }
}

use thiserror::Error;

pub type PropsResult<T> = Result<T, PropsError>;

#[derive(Error, Debug)]
pub enum PropsError {
    #[error("Unknown fluid: {name}")]
    UnknownFluid { name: String },

    #[error("Unknown pipe material: {name}")]
    UnknownMaterial { name: String },

    #[error(
        "Dimensionless time step {dtau:.3e} is below the smallest tabulated weighting scale {tau_min:.3e}"
    )]
    TimeScaleBelowTable { dtau: f64, tau_min: f64 },
}

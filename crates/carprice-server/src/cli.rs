use carprice_core::{Feature, RawInputs};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "carprice")]
#[command(author, version, about = "Estimate car prices with the exported GBM model")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the web form server
    Serve {
        /// Listen port
        #[arg(short, long, env = "PORT")]
        port: Option<u16>,

        /// Listen address
        #[arg(short, long)]
        address: Option<String>,

        #[command(flatten)]
        common: CommonArgs,

        /// Load the model before accepting connections; exit if it fails
        #[arg(long)]
        preload: bool,
    },

    /// Estimate a single price and print it
    Predict {
        #[command(flatten)]
        vehicle: VehicleArgs,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Print metadata of the model artifact as JSON
    Inspect {
        #[command(flatten)]
        common: CommonArgs,
    },
}

/// Options shared by every subcommand
#[derive(Args, Debug)]
pub struct CommonArgs {
    /// Model artifact directory or JSON file
    #[arg(short, long)]
    pub model: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, default_value = "carprice.yaml")]
    pub config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// The ten vehicle attributes, taken as text and coerced like form input
#[derive(Args, Debug)]
pub struct VehicleArgs {
    /// Car company code (0-15)
    #[arg(long, allow_hyphen_values = true)]
    pub company_code: String,

    /// Car model code (0-1000)
    #[arg(long, allow_hyphen_values = true)]
    pub model_code: String,

    /// Engine type code (0-20)
    #[arg(long, allow_hyphen_values = true)]
    pub engine_code: String,

    /// CC or battery capacity (0-7000)
    #[arg(long, allow_hyphen_values = true)]
    pub cc_battery: String,

    /// Horsepower (0-1200)
    #[arg(long, allow_hyphen_values = true)]
    pub horsepower: String,

    /// Top speed in km/h (0-350)
    #[arg(long, allow_hyphen_values = true)]
    pub top_speed: String,

    /// 0-100 km/h time in seconds (0-20)
    #[arg(long, allow_hyphen_values = true)]
    pub perf_0_100: String,

    /// Fuel type code (0-5)
    #[arg(long, allow_hyphen_values = true)]
    pub fuel_type_code: String,

    /// Number of seats (1-8)
    #[arg(long, allow_hyphen_values = true)]
    pub seats: String,

    /// Torque in Nm (0-1500)
    #[arg(long, allow_hyphen_values = true)]
    pub torque: String,
}

impl VehicleArgs {
    pub fn to_raw_inputs(&self) -> RawInputs {
        let values = [
            &self.company_code,
            &self.model_code,
            &self.engine_code,
            &self.cc_battery,
            &self.horsepower,
            &self.top_speed,
            &self.perf_0_100,
            &self.fuel_type_code,
            &self.seats,
            &self.torque,
        ];

        Feature::ALL
            .into_iter()
            .zip(values)
            .fold(RawInputs::default(), |inputs, (feature, value)| {
                inputs.with(feature, value.as_str())
            })
    }
}

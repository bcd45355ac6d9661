//! `cotizador catalog` subcommand

use clap::Subcommand;

use crate::config::AppConfig;
use crate::services::CatalogClient;
use crate::types::Result;

/// Vehicle catalog lookups
#[derive(Subcommand, Debug)]
pub enum CatalogCommand {
    /// List brands for a model year
    Brands {
        #[arg(long)]
        anio: String,
    },

    /// List models of a brand
    Models {
        #[arg(long)]
        anio: String,
        #[arg(long)]
        marca: String,
    },

    /// List version descriptions of a model
    Descriptions {
        #[arg(long)]
        anio: String,
        #[arg(long)]
        marca: String,
        #[arg(long)]
        modelo: String,
    },
}

impl CatalogCommand {
    pub fn run(self, config: &AppConfig) -> Result<()> {
        let client = CatalogClient::new(config)?;
        let items = match self {
            Self::Brands { anio } => client.brands(&anio)?,
            Self::Models { anio, marca } => client.models(&anio, &marca)?,
            Self::Descriptions {
                anio,
                marca,
                modelo,
            } => client.descriptions(&anio, &marca, &modelo)?,
        };

        for item in items {
            println!("{}", item);
        }
        Ok(())
    }
}

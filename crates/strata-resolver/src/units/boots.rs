use serde::Deserialize;

use strata_core::DEFAULT_PLATFORM;
use strata_util::errors::StrataError;

use crate::context::Context;
use crate::unit::{validate, Boot, BuilderContext, Unit, UnitFactory, UnitInstance, UnitKind};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PlatformConfiguration {
    #[serde(default = "default_platform")]
    default_platform: String,
}

fn default_platform() -> String {
    DEFAULT_PLATFORM.to_string()
}

/// Fills an unset runtime platform with a default.
pub struct PlatformBoot {
    default_platform: String,
}

impl UnitFactory for PlatformBoot {
    const NAME: &'static str = "PlatformBoot";
    const KIND: UnitKind = UnitKind::Boot;

    fn should_include(context: &BuilderContext<'_>) -> Option<toml::Table> {
        if context.is_included(Self::NAME) {
            return None;
        }
        Some(toml::Table::new())
    }

    fn from_configuration(configuration: toml::Table) -> Result<UnitInstance, StrataError> {
        let config: PlatformConfiguration = validate(Self::NAME, configuration)?;
        Ok(UnitInstance::Boot(Box::new(PlatformBoot {
            default_platform: config.default_platform,
        })))
    }
}

impl Unit for PlatformBoot {
    fn name(&self) -> &'static str {
        Self::NAME
    }
}

impl Boot for PlatformBoot {
    fn run(&mut self, context: &mut Context) {
        let runtime = &mut context.project.manifest.runtime_environment;
        if runtime.platform.is_none() {
            tracing::info!("No platform configured, using {}", self.default_platform);
            runtime.platform = Some(self.default_platform.clone());
        }
    }
}

//! Environment source: SDKGEN__BUILD__HARD_CAP=16, SDKGEN__UNITS=s3,sqs

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::Environment;

pub fn add_to_builder(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix("SDKGEN")
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("units")
            .with_list_parse_key("codegen.dependencies")
            .with_list_parse_key("codegen.repositories"),
    )
}

//! Print or check the effective configuration.

use crate::cli::ConfigArgs;
use crate::commands::CommandContext;
use crate::error::Result;
use crate::ui;

pub fn execute(context: &CommandContext, args: ConfigArgs) -> Result<()> {
    context.config.validate()?;
    if args.check {
        ui::success("Configuration is valid");
    } else {
        print!("{}", context.config.to_toml_string()?);
    }
    Ok(())
}

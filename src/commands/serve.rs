//! The `fintrack serve` command.

use crate::args::ServeArgs;
use crate::commands::Out;
use crate::{web, Config, Mode, Result};

/// Serves the HTTP API until the process receives Ctrl-C. `--bind` wins over the `bind` setting
/// in `config.json`.
pub async fn serve(config: Config, mode: Mode, args: ServeArgs) -> Result<Out<()>> {
    let bind = args.bind.unwrap_or_else(|| config.bind().to_string());
    web::serve(config, mode, &bind).await?;
    Ok("The HTTP server has shut down".into())
}

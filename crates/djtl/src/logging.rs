use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;
use tracing_subscriber::Registry;

use crate::args::GlobalArgs;

/// Install a stderr `fmt` layer.
///
/// `RUST_LOG` wins when set. Otherwise the level comes from `-q`/`-v`, with
/// the `debug` setting raising the default to `debug`.
pub fn init_tracing(args: &GlobalArgs, debug: bool) {
    let default_directive = default_directive(args, debug);
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(args.verbose > 1)
        .without_time()
        .with_filter(env_filter);

    Registry::default().with(stderr_layer).init();
}

fn default_directive(args: &GlobalArgs, debug: bool) -> &'static str {
    match (args.quiet, args.verbose, debug) {
        (true, _, _) => "off",
        (false, 0, false) => "warn",
        (false, 0, true) | (false, 1, _) => "debug",
        (false, _, _) => "trace",
    }
}

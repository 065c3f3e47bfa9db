use clap::ValueEnum;
use neutronium_compiler::RuntimeMode;

/// Runtime import target selectable from the command line
#[derive(Copy, Clone, PartialEq, Eq, Debug, ValueEnum)]
pub enum RuntimeArg {
    /// Import from node_modules/neutronium (requires `npm install neutronium`)
    #[value(name = "node-modules")]
    NodeModules,

    /// Import a bundled copy written into the output directory
    #[value(name = "local")]
    Local,

    /// Import from the esm.sh CDN
    #[value(name = "cdn")]
    Cdn,
}

impl From<RuntimeArg> for RuntimeMode {
    fn from(arg: RuntimeArg) -> Self {
        match arg {
            RuntimeArg::NodeModules => RuntimeMode::NodeModules,
            RuntimeArg::Local => RuntimeMode::Local,
            RuntimeArg::Cdn => RuntimeMode::Cdn,
        }
    }
}

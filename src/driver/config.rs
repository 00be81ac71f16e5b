use clap::Parser as ClapParser;
use std::path::PathBuf;

#[derive(ClapParser, Debug)]
pub struct CliArgs {
    pub src_filepath: PathBuf,

    /// Stop after translation and write the textual IR.
    #[clap(long = "ir")]
    pub until_ir: bool,

    /// Run instruction selection and write ARM32 assembly.
    #[clap(short = 'S')]
    pub until_asm: bool,

    #[clap(short = 'o')]
    pub output: Option<PathBuf>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum EmitKind {
    Ir,
    Asm,
}

#[derive(Debug)]
pub struct Args {
    pub src_filepath: PathBuf,
    pub emit: EmitKind,
    pub output: Option<PathBuf>,
}

impl From<CliArgs> for Args {
    fn from(cli_args: CliArgs) -> Self {
        // `-S` wins over `--ir`; assembly is the default.
        let emit = if cli_args.until_asm {
            EmitKind::Asm
        } else if cli_args.until_ir {
            EmitKind::Ir
        } else {
            EmitKind::Asm
        };
        Self {
            src_filepath: cli_args.src_filepath,
            emit,
            output: cli_args.output,
        }
    }
}

impl Args {
    pub fn output_filepath(&self) -> PathBuf {
        match &self.output {
            Some(path) => path.clone(),
            None => {
                let ext = match self.emit {
                    EmitKind::Ir => "ir",
                    EmitKind::Asm => "s",
                };
                self.src_filepath.with_extension(ext)
            }
        }
    }
}

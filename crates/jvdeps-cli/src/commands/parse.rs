//! Parse one file and print its structural facts.

use jvdeps_parser::{ParseResult, ScannerParser, SourceFile, SourceParser, WorkerPool};

use crate::cli::ParseArgs;
use crate::commands::{CommandContext, utils};
use crate::error::{Result, ResultExt};

pub async fn execute(context: &CommandContext, args: ParseArgs) -> Result<()> {
    let parsed = parse_file(context, &args).await?;
    println!("{}", serde_json::to_string_pretty(&parsed)?);
    Ok(())
}

pub async fn parse_file(context: &CommandContext, args: &ParseArgs) -> Result<ParseResult> {
    let contents = tokio::fs::read_to_string(&args.file)
        .await
        .with_path(&args.file)?;
    let file = SourceFile::new(args.file.clone(), contents);

    let parser: Box<dyn SourceParser> = if args.in_process {
        Box::new(ScannerParser)
    } else {
        context.config.validate()?;
        let options = utils::pool_options(&context.config)?.pool_size(1);
        Box::new(WorkerPool::start(options)?)
    };

    let result = parser.parse(&file).await;
    parser.shutdown().await;
    Ok(result?)
}

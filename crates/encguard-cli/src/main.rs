use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use encguard_core::{
    detect_file, resolve_encoding_name, validate_dir, EncodingDetector, UniversalDetector, ValidateOptions, EXIT_FATAL,
    EXIT_MISMATCH, EXIT_SUCCESS,
};
use std::path::PathBuf;
use tracing::info;

/// 命令行入口（基于 clap）
#[derive(Parser, Debug)]
#[command(name = "encguard", version, about = "按 glob 规则校验目录内文件的字符编码", disable_version_flag = true)]
struct Cli {
    /// 打印版本号并退出
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    version: Option<bool>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 按规则表校验目录内文件的编码
    Validate {
        /// 待校验目录
        #[arg(short = 'p', long, default_value = ".")]
        path: PathBuf,

        /// 规则文件路径（JSON 或 TOML），默认 ./workflow-repo/.github/scripts/encoding.json
        #[arg(short = 'r', long)]
        rules: Option<PathBuf>,
    },
    /// 检测并打印单个文件的编码（不做规则比较）
    Detect {
        /// 待检测文件
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

fn main() {
    // 初始化日志（支持通过 RUST_LOG 控制等级，例如 info、debug）
    init_tracing();
    let cli = Cli::parse();

    let exit_code = match run(cli.command) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            EXIT_FATAL
        }
    };
    std::process::exit(exit_code);
}

fn run(command: Commands) -> Result<i32> {
    match command {
        Commands::Validate { path, rules } => run_validate(path, rules),
        Commands::Detect { files } => run_detect(&files),
    }
}

fn run_validate(path: PathBuf, rules: Option<PathBuf>) -> Result<i32> {
    let opts = ValidateOptions { rules_path: rules };
    info!(path = %path.display(), rules = %opts.rules_path().display(), "loading rules");
    // 目录检查先于规则加载（在 validate_dir 内完成）
    let report = validate_dir(&path, &opts).context("validation failed")?;

    // 不匹配记录按检测顺序统一输出到 stdout
    if report.is_clean() {
        return Ok(EXIT_SUCCESS);
    }
    for err in &report.errors {
        println!("{err}");
    }
    Ok(EXIT_MISMATCH)
}

fn run_detect(files: &[PathBuf]) -> Result<i32> {
    let mut detector = UniversalDetector::new();
    // 出错时同样关闭检测器
    let outcome = detect_each(files, &mut detector);
    detector.close();
    outcome.map(|()| EXIT_SUCCESS)
}

fn detect_each(files: &[PathBuf], detector: &mut UniversalDetector) -> Result<()> {
    for file in files {
        let result = detect_file(file, detector).with_context(|| format!("detect {}", file.display()))?;
        println!("{}: {} (confidence {:.2})", file.display(), resolve_encoding_name(&result), result.confidence);
    }
    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};
    // 日志写到 stderr，stdout 只保留校验报告
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

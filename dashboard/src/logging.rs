use chrono::Local;
use env_logger::{Builder, Env, Target};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

/// 画面はTUIが使うので、ログはファイルに書き出す。
/// フィルタは RUST_LOG（未指定なら info）
pub fn init(path: &Path) -> io::Result<()> {
    let target = Box::new(OpenOptions::new().create(true).append(true).open(path)?);
    Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "{}:{} {} [{}] - {}",
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                Local::now().format("%Y-%m-%dT%H:%M:%S%.3f"),
                record.level(),
                record.args()
            )
        })
        .target(Target::Pipe(target))
        .init();
    Ok(())
}

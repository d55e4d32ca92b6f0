use anyhow::Result;
use essay_eval::orchestrator::App;
use essay_eval::utils::logging;
use essay_eval::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logging::init();

    // 加载配置（配置文件 + 环境变量覆盖）
    let config = Config::load();

    // 初始化并运行应用
    App::initialize(config).await?.run().await?;

    Ok(())
}

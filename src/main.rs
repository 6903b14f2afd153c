use neondrift::{AppError, Scene, SceneConfig};

fn main() -> Result<(), AppError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let scene = Scene::new(SceneConfig::default(), None)?;
    neondrift::run(scene)
}

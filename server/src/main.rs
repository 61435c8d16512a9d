use server::{
    cli::{self, Command},
    config::{Config, EVENT_STORE_DIR},
    engine::ServerEngine,
    registry::Registry,
    transport::{self, Shared},
};
use std::{net::IpAddr, sync::Arc};
use tokio::sync::Mutex;

#[tokio::main]
async fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = Config::from_args(&args);

    let store = engine::store::EventStore::new(EVENT_STORE_DIR).expect("event store directory should be usable");
    let shared = Shared {
        registry: Arc::new(Mutex::new(Registry::new())),
        engine: Arc::new(ServerEngine::new(store)),
    };

    let routes = transport::routes(shared.clone());
    let host: IpAddr = config
        .host
        .as_deref()
        .map(|h| h.parse().expect("host should be a valid ip address"))
        .unwrap_or_else(|| IpAddr::from([0, 0, 0, 0]));

    log::info!("listening on {host}:{}", config.port);
    tokio::spawn(warp::serve(routes).run((host, config.port)));

    run_console(shared).await;
}

async fn run_console(shared: Shared) {
    let mut commands = cli::spawn_reader();

    while let Some(command) = commands.recv().await {
        match command {
            Command::Quit => {
                log::info!("shutting down");
                break;
            }
            Command::New => {
                let game_id = shared.engine.init_new_game().await;
                println!("{game_id}");
            }
            Command::Load { game_id } => match shared.engine.load_game(game_id).await {
                Ok(()) => println!("loaded game {game_id}"),
                Err(err) => log::error!("failed to load game {game_id}: {err}"),
            },
            Command::Start { game_id, init_word } => {
                let players: Vec<String> = {
                    let registry = shared.registry.lock().await;
                    registry.usernames_in_game(game_id, None).map(str::to_string).collect()
                };
                let registry = shared.registry.lock().await;
                if let Err(err) = shared.engine.start_game(game_id, players, &init_word, &registry).await {
                    log::error!("failed to start game {game_id}: {err}");
                }
            }
            Command::Disconnect { game_id, player } => {
                let registry = shared.registry.lock().await;
                registry.disconnect(&(player, game_id));
            }
        }
    }
}

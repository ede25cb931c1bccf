//! Live API: ping and online players.
//!
//! The player list comes from a `PlayerSource` supplied by the embedding
//! server (game plugin, test fixture). Filtering is configuration-driven:
//! invisible players, sneaking players, and players in hidden game modes can
//! each be excluded independently.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Clone)]
pub struct Player {
    pub uuid: String,
    pub name: String,
    pub world: String,
    pub position: Position,
    pub online: bool,
    pub invisible: bool,
    pub sneaking: bool,
    pub gamemode: String,
}

/// Provider of the currently online players.
pub trait PlayerSource: Send + Sync {
    fn online_players(&self) -> Vec<Player>;
}

/// Source with no players (headless/CLI serving).
pub struct NoPlayers;

impl PlayerSource for NoPlayers {
    fn online_players(&self) -> Vec<Player> {
        Vec::new()
    }
}

#[derive(Debug, Clone, Default)]
pub struct LiveSettings {
    pub hide_invisible: bool,
    pub hide_sneaking: bool,
    pub hidden_gamemodes: Vec<String>,
}

#[derive(Serialize)]
struct PlayerView<'a> {
    uuid: &'a str,
    name: &'a str,
    world: &'a str,
    position: Position,
}

#[derive(Serialize)]
struct PlayersBody<'a> {
    players: Vec<PlayerView<'a>>,
}

pub(crate) fn ping_body() -> &'static str {
    "{\"status\":\"OK\"}"
}

/// Render the filtered players array as a JSON body.
pub(crate) fn players_body(source: &dyn PlayerSource, settings: &LiveSettings) -> String {
    let players = source.online_players();
    let views: Vec<PlayerView<'_>> = players
        .iter()
        .filter(|p| p.online)
        .filter(|p| !(settings.hide_invisible && p.invisible))
        .filter(|p| !(settings.hide_sneaking && p.sneaking))
        .filter(|p| !settings.hidden_gamemodes.contains(&p.gamemode))
        .map(|p| PlayerView {
            uuid: &p.uuid,
            name: &p.name,
            world: &p.world,
            position: p.position,
        })
        .collect();

    serde_json::to_string(&PlayersBody { players: views })
        .unwrap_or_else(|_| "{\"players\":[]}".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(name: &str) -> Player {
        Player {
            uuid: format!("uuid-{}", name),
            name: name.to_string(),
            world: "world".to_string(),
            position: Position {
                x: 1.0,
                y: 64.0,
                z: -3.5,
            },
            online: true,
            invisible: false,
            sneaking: false,
            gamemode: "survival".to_string(),
        }
    }

    struct Fixed(Vec<Player>);

    impl PlayerSource for Fixed {
        fn online_players(&self) -> Vec<Player> {
            self.0.clone()
        }
    }

    #[test]
    fn filters_apply_independently() {
        let mut invisible = player("ghost");
        invisible.invisible = true;
        let mut sneaking = player("sneak");
        sneaking.sneaking = true;
        let visible = player("steve");

        let source = Fixed(vec![invisible, sneaking, visible]);
        let settings = LiveSettings {
            hide_invisible: true,
            hide_sneaking: true,
            hidden_gamemodes: vec![],
        };

        let body = players_body(&source, &settings);
        let v: serde_json::Value = serde_json::from_str(&body).expect("json");
        let players = v["players"].as_array().expect("array");
        assert_eq!(players.len(), 1);
        assert_eq!(players[0]["uuid"], "uuid-steve");
        assert_eq!(players[0]["position"]["y"], 64.0);
    }

    #[test]
    fn hidden_gamemode_filtered() {
        let mut spectator = player("spec");
        spectator.gamemode = "spectator".to_string();
        let source = Fixed(vec![spectator, player("steve")]);
        let settings = LiveSettings {
            hidden_gamemodes: vec!["spectator".to_string()],
            ..Default::default()
        };
        let body = players_body(&source, &settings);
        let v: serde_json::Value = serde_json::from_str(&body).expect("json");
        assert_eq!(v["players"].as_array().expect("array").len(), 1);
    }

    #[test]
    fn offline_players_never_listed() {
        let mut offline = player("gone");
        offline.online = false;
        let source = Fixed(vec![offline]);
        let body = players_body(&source, &LiveSettings::default());
        let v: serde_json::Value = serde_json::from_str(&body).expect("json");
        assert!(v["players"].as_array().expect("array").is_empty());
    }
}

//! Command line and environment configuration.

use clap::Parser;

use crate::domain::{EchoPolicy, RoomKey};

#[derive(Parser, Debug, Clone)]
#[command(name = "tsudoi-server")]
#[command(about = "Room-scoped real-time relay for whiteboards, chat and code sessions", long_about = None)]
pub struct ServerConfig {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    pub host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    pub port: u16,

    /// Default log level (overridden by RUST_LOG)
    #[arg(long, default_value = "debug")]
    pub log_level: String,

    /// Redis URL; when set, broadcasts are relayed through Redis pub/sub
    #[arg(long, env = "REDIS_URL")]
    pub redis_url: Option<String>,

    /// Echo live strokes and added objects back to their sender
    #[arg(long)]
    pub echo_drawings: bool,

    /// Joinable room as `kind:id` (repeatable). Without any, every room is open
    #[arg(long = "room", value_name = "KIND:ID")]
    pub rooms: Vec<RoomKey>,

    /// Known but closed room as `kind:id` (repeatable)
    #[arg(long = "inactive-room", value_name = "KIND:ID")]
    pub inactive_rooms: Vec<RoomKey>,
}

impl ServerConfig {
    pub fn echo_policy(&self) -> EchoPolicy {
        if self.echo_drawings {
            EchoPolicy::IncludeSender
        } else {
            EchoPolicy::ExcludeSender
        }
    }

    /// Whether joins are checked against a fixed room list.
    pub fn restricts_rooms(&self) -> bool {
        !self.rooms.is_empty() || !self.inactive_rooms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        // テスト項目: 引数なしで既定値になる
        // given (前提条件):
        let args = ["tsudoi-server"];

        // when (操作):
        let config = ServerConfig::try_parse_from(args).unwrap();

        // then (期待する結果):
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.echo_policy(), EchoPolicy::ExcludeSender);
        assert!(!config.restricts_rooms());
    }

    #[test]
    fn test_room_lists_and_echo() {
        // テスト項目: ルーム指定とエコー指定が解析される
        // given (前提条件):
        let args = [
            "tsudoi-server",
            "--room",
            "whiteboard:abc",
            "--room",
            "ide:r1",
            "--inactive-room",
            "chat:old",
            "--echo-drawings",
        ];

        // when (操作):
        let config = ServerConfig::try_parse_from(args).unwrap();

        // then (期待する結果):
        let rooms: Vec<String> = config.rooms.iter().map(|k| k.to_string()).collect();
        assert_eq!(rooms, vec!["whiteboard:abc", "code:r1"]);
        assert_eq!(config.inactive_rooms.len(), 1);
        assert!(config.restricts_rooms());
        assert_eq!(config.echo_policy(), EchoPolicy::IncludeSender);
    }

    #[test]
    fn test_malformed_room_is_rejected() {
        // テスト項目: kind:id 形式でないルーム指定はエラーになる
        // given (前提条件):
        let args = ["tsudoi-server", "--room", "abc"];

        // when (操作):
        let result = ServerConfig::try_parse_from(args);

        // then (期待する結果):
        assert!(result.is_err());
    }
}

// Typed query wrappers
//
// Status comes back as raw JSON so the caller decides how to read it;
// list queries are decoded into wire models.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::client::{XScheduleClient, check_result};
use crate::error::Error;
use crate::models::{NextScheduled, Playlist, PlaylistStep};

pub const GET_PLAYING_STATUS: &str = "GetPlayingStatus";
pub const GET_PLAYLISTS: &str = "GetPlayLists";
pub const GET_PLAYLIST_STEPS: &str = "GetPlayListSteps";
pub const GET_NEXT_SCHEDULED: &str = "GetNextScheduledPlayList";

impl XScheduleClient {
    /// Raw `GetPlayingStatus` object.
    pub async fn get_playing_status(&self) -> Result<Value, Error> {
        check_result(self.query(GET_PLAYING_STATUS, "").await?)
    }

    /// All playlists, in server order.
    pub async fn get_playlists(&self) -> Result<Vec<Playlist>, Error> {
        let reply = check_result(self.query(GET_PLAYLISTS, "").await?)?;
        let playlists: Vec<Playlist> = decode_list(reply, "playlists")?;
        debug!(count = playlists.len(), "fetched playlists");
        Ok(playlists)
    }

    /// Steps of one playlist, looked up by name or id.
    pub async fn get_playlist_steps(&self, playlist: &str) -> Result<Vec<PlaylistStep>, Error> {
        let reply = check_result(self.query(GET_PLAYLIST_STEPS, playlist).await?)?;
        decode_list(reply, "steps")
    }

    pub async fn get_next_scheduled_playlist(&self) -> Result<NextScheduled, Error> {
        let reply = check_result(self.query(GET_NEXT_SCHEDULED, "").await?)?;
        serde_json::from_value(reply).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body: String::new(),
        })
    }
}

/// Pull `key` out of the reply as a list. A missing key is an empty list.
fn decode_list<T: DeserializeOwned>(mut reply: Value, key: &str) -> Result<Vec<T>, Error> {
    match reply.get_mut(key).map(Value::take) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(list) => {
            let body = list.to_string();
            serde_json::from_value(list).map_err(|e| Error::Deserialization {
                message: format!("{key}: {e}"),
                body,
            })
        }
    }
}

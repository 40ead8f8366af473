//! Schedule document model.
//!
//! Rust field names are English; the serde names are the Italian element
//! names of the wire format, which must match exactly. The same names are
//! used when a schedule is re-serialized (e.g. to JSON for a local UI), with
//! collections flattened to plain arrays.
//!
//! Every leaf defaults when missing. Numeric and boolean leaves go through
//! [`lenient`](crate::lenient) so a malformed leaf never fails the document.

use crate::lenient;
use chrono::{NaiveTime, Weekday};
use serde::de::{self, IgnoredAny, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;

/// Root element of a schedule document.
pub const ROOT_ELEMENT: &str = "it.zerounorabbit.spotlivescreen.SchermoXml";

/// Slot value meaning "unused" in the download-time fields.
const UNSET_TIME: &str = "00:00:00";

/// Playback duration used when a media item carries none.
pub const DEFAULT_DISPLAY_SECONDS: u32 = 10;

/// Children of a wrapped list element. Only `element` children are kept;
/// anything else between them (comments, `<null/>` placeholders, unknown
/// tags) is skipped. An empty or text-only wrapper yields no items.
struct WrappedItems<T> {
    element: &'static str,
    marker: PhantomData<T>,
}

impl<'de, T: Deserialize<'de>> Visitor<'de> for WrappedItems<T> {
    type Value = Vec<T>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "a list of <{}> elements", self.element)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(Vec::new())
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(Vec::new())
    }

    fn visit_str<E: de::Error>(self, _: &str) -> Result<Self::Value, E> {
        Ok(Vec::new())
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_map(self)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut items = Vec::new();
        while let Some(key) = map.next_key::<String>()? {
            if key == self.element {
                items.push(map.next_value()?);
            } else {
                map.next_value::<IgnoredAny>()?;
            }
        }
        Ok(items)
    }
}

/// Generates a deserializer for a wrapped list: `<outer><ITEM/>...<ITEM/></outer>`.
macro_rules! wrapped_list {
    ($name:ident, $item:ty, $element:literal) => {
        fn $name<'de, D>(deserializer: D) -> Result<Vec<$item>, D::Error>
        where
            D: Deserializer<'de>,
        {
            deserializer.deserialize_option(WrappedItems::<$item> {
                element: $element,
                marker: PhantomData,
            })
        }
    };
}

wrapped_list!(link_list, WindowMediaLink, "it.zerounorabbit.spotlivescreen.MediaFinestra");
wrapped_list!(media_list, MediaItem, "it.zerounorabbit.spotlivescreen.Media");
wrapped_list!(window_list, Window, "it.zerounorabbit.spotlivescreen.Finestra");
wrapped_list!(time_slot_list, TimeSlot, "it.zerounorabbit.spotlivescreen.Orario");

/// The remote schedule document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    #[serde(rename = "schermo", default)]
    pub screen: Screen,

    #[serde(rename = "mediaFinestre", default, deserialize_with = "link_list")]
    pub links: Vec<WindowMediaLink>,

    /// Present or absent; the content is not interpreted.
    #[serde(rename = "programmazioni", default)]
    pub programming: Option<Uninterpreted>,

    #[serde(rename = "media", default, deserialize_with = "media_list")]
    pub media: Vec<MediaItem>,
}

impl Schedule {
    /// Download-time slots that are set, in slot order.
    pub fn download_times(&self) -> Vec<&str> {
        self.screen
            .download_slots()
            .into_iter()
            .filter(|slot| !slot.is_empty() && *slot != UNSET_TIME)
            .collect()
    }

    /// Media to play: items of active, approved links ordered by `ordine`.
    ///
    /// The sort is stable so links sharing an index keep document order.
    pub fn playlist(&self) -> Vec<&MediaItem> {
        let mut links: Vec<&WindowMediaLink> = self
            .links
            .iter()
            .filter(|link| link.media.active && link.media.approved)
            .collect();
        links.sort_by_key(|link| link.order);
        links.into_iter().map(|link| &link.media).collect()
    }
}

/// Marker for a subtree that is kept only as present/absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Uninterpreted;

impl<'de> Deserialize<'de> for Uninterpreted {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        IgnoredAny::deserialize(deserializer)?;
        Ok(Uninterpreted)
    }
}

impl Serialize for Uninterpreted {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_map(Some(0))?.end()
    }
}

/// Display description (`schermo`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Screen {
    #[serde(deserialize_with = "lenient::int")]
    pub id: i64,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "indirizzo")]
    pub address: String,
    #[serde(rename = "larghezza", deserialize_with = "lenient::int")]
    pub width: i64,
    #[serde(rename = "altezza", deserialize_with = "lenient::int")]
    pub height: i64,
    #[serde(rename = "attivo", deserialize_with = "lenient::flag")]
    pub active: bool,

    #[serde(rename = "finestre", deserialize_with = "window_list")]
    pub windows: Vec<Window>,
    #[serde(rename = "orari", deserialize_with = "time_slot_list")]
    pub time_slots: Vec<TimeSlot>,
    #[serde(rename = "categoriaMerceologica")]
    pub category: Category,

    #[serde(rename = "lun", deserialize_with = "lenient::flag")]
    pub monday: bool,
    #[serde(rename = "mar", deserialize_with = "lenient::flag")]
    pub tuesday: bool,
    #[serde(rename = "mer", deserialize_with = "lenient::flag")]
    pub wednesday: bool,
    #[serde(rename = "gio", deserialize_with = "lenient::flag")]
    pub thursday: bool,
    #[serde(rename = "ven", deserialize_with = "lenient::flag")]
    pub friday: bool,
    #[serde(rename = "sab", deserialize_with = "lenient::flag")]
    pub saturday: bool,
    #[serde(rename = "dom", deserialize_with = "lenient::flag")]
    pub sunday: bool,

    /// Sequential (`true`) or shuffled playback
    #[serde(rename = "elenco", deserialize_with = "lenient::flag")]
    pub sequential: bool,

    #[serde(rename = "oraDownload01")]
    pub download_01: String,
    #[serde(rename = "oraDownload02")]
    pub download_02: String,
    #[serde(rename = "oraDownload03")]
    pub download_03: String,
    #[serde(rename = "oraDownload04")]
    pub download_04: String,
    #[serde(rename = "oraDownload05")]
    pub download_05: String,
    #[serde(rename = "oraDownload06")]
    pub download_06: String,
    #[serde(rename = "oraDownload07")]
    pub download_07: String,
    #[serde(rename = "oraDownload08")]
    pub download_08: String,

    #[serde(rename = "oraRestart")]
    pub restart_at: String,
}

impl Screen {
    fn download_slots(&self) -> [&str; 8] {
        [
            self.download_01.as_str(),
            self.download_02.as_str(),
            self.download_03.as_str(),
            self.download_04.as_str(),
            self.download_05.as_str(),
            self.download_06.as_str(),
            self.download_07.as_str(),
            self.download_08.as_str(),
        ]
    }

    pub fn plays_on(&self, day: Weekday) -> bool {
        match day {
            Weekday::Mon => self.monday,
            Weekday::Tue => self.tuesday,
            Weekday::Wed => self.wednesday,
            Weekday::Thu => self.thursday,
            Weekday::Fri => self.friday,
            Weekday::Sat => self.saturday,
            Weekday::Sun => self.sunday,
        }
    }

    /// `oraRestart` as a time of day; `None` when unset or unparsable.
    pub fn restart_time(&self) -> Option<NaiveTime> {
        parse_time_of_day(&self.restart_at)
    }
}

/// Screen region (`Finestra`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Window {
    #[serde(deserialize_with = "lenient::int")]
    pub id: i64,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "altezza", deserialize_with = "lenient::int")]
    pub height: i64,
    #[serde(rename = "larghezza", deserialize_with = "lenient::int")]
    pub width: i64,
    #[serde(rename = "alto", deserialize_with = "lenient::int")]
    pub top: i64,
    #[serde(rename = "destra", deserialize_with = "lenient::int")]
    pub right: i64,
    #[serde(rename = "attiva", deserialize_with = "lenient::flag")]
    pub active: bool,
    #[serde(deserialize_with = "lenient::flag")]
    pub spot: bool,
    /// Image shown while offline; empty when not configured
    #[serde(rename = "imgNoInternet")]
    pub offline_image: String,
    #[serde(deserialize_with = "lenient::flag")]
    pub audio: bool,
}

/// Time band (`Orario`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeSlot {
    #[serde(deserialize_with = "lenient::int")]
    pub id: i64,
    #[serde(rename = "oraInizio")]
    pub starts_at: String,
    #[serde(rename = "oraFine")]
    pub ends_at: String,
    #[serde(rename = "crediti", deserialize_with = "lenient::int")]
    pub credits: i64,
}

impl TimeSlot {
    /// Whether `time` falls in `[start, end)`. Bands crossing midnight wrap.
    pub fn contains(&self, time: NaiveTime) -> bool {
        match (
            parse_time_of_day(&self.starts_at),
            parse_time_of_day(&self.ends_at),
        ) {
            (Some(start), Some(end)) if start <= end => start <= time && time < end,
            (Some(start), Some(end)) => time >= start || time < end,
            _ => false,
        }
    }
}

/// Window/media association (`MediaFinestra`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowMediaLink {
    #[serde(deserialize_with = "lenient::int")]
    pub id: i64,
    /// Link type, e.g. spot or content
    #[serde(rename = "tipo")]
    pub kind: String,
    #[serde(rename = "ordine", deserialize_with = "lenient::int")]
    pub order: i64,
    pub media: MediaItem,
}

/// A piece of content (`Media`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaItem {
    #[serde(deserialize_with = "lenient::int")]
    pub id: i64,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "attivo", deserialize_with = "lenient::flag")]
    pub active: bool,
    #[serde(rename = "tipo")]
    pub kind: String,
    /// Asset paths; empty means not applicable
    pub video: String,
    #[serde(rename = "immagine")]
    pub image: String,
    pub audio: String,
    #[serde(rename = "miniatura")]
    pub thumbnail: String,
    #[serde(rename = "pubblico", deserialize_with = "lenient::flag")]
    pub public: bool,
    /// Display duration in seconds; 0 when unset
    #[serde(rename = "tempo", deserialize_with = "lenient::int")]
    pub duration_secs: i64,
    #[serde(rename = "numeroNotizie", deserialize_with = "lenient::int")]
    pub news_count: i64,
    #[serde(rename = "approvato", deserialize_with = "lenient::flag")]
    pub approved: bool,
    #[serde(rename = "crediti", deserialize_with = "lenient::int")]
    pub credits: i64,
    #[serde(rename = "categoria")]
    pub category: Category,
}

impl MediaItem {
    /// Non-empty asset paths in video, image, audio order.
    pub fn asset_paths(&self) -> impl Iterator<Item = &str> {
        [self.video.as_str(), self.image.as_str(), self.audio.as_str()]
            .into_iter()
            .filter(|path| !path.is_empty())
    }

    /// Seconds to keep the item on screen.
    pub fn display_seconds(&self) -> u32 {
        match u32::try_from(self.duration_secs) {
            Ok(0) | Err(_) => DEFAULT_DISPLAY_SECONDS,
            Ok(secs) => secs,
        }
    }
}

/// Category reference (`categoria`, `categoriaMerceologica`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Category {
    #[serde(deserialize_with = "lenient::int")]
    pub id: i64,
    #[serde(rename = "nome")]
    pub name: String,
}

fn parse_time_of_day(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .ok()
}

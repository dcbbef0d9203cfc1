//! Notification display metadata: kind descriptors and action routing.

use nexo_api::Notification;

/// Notification category parsed from the free-form wire tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    FollowUp,
    Prospect,
    Sale,
    Ticket,
    Warehouse,
    System,
    Unknown,
}

/// Icon name and accent tone a renderer uses for one notification kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindDescriptor {
    pub icon: &'static str,
    pub accent: &'static str,
}

impl NotificationKind {
    /// Parses the wire tag; unrecognized tags land on `Unknown`.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "seguimiento" | "seguimiento_vencido" => NotificationKind::FollowUp,
            "prospecto" => NotificationKind::Prospect,
            "venta" => NotificationKind::Sale,
            "ticket" | "soporte" => NotificationKind::Ticket,
            "almacen" | "almacén" => NotificationKind::Warehouse,
            "sistema" => NotificationKind::System,
            _ => NotificationKind::Unknown,
        }
    }

    pub fn descriptor(&self) -> KindDescriptor {
        match self {
            NotificationKind::FollowUp => KindDescriptor {
                icon: "calendar-clock",
                accent: "amber",
            },
            NotificationKind::Prospect => KindDescriptor {
                icon: "user-plus",
                accent: "blue",
            },
            NotificationKind::Sale => KindDescriptor {
                icon: "trending-up",
                accent: "emerald",
            },
            NotificationKind::Ticket => KindDescriptor {
                icon: "life-buoy",
                accent: "violet",
            },
            NotificationKind::Warehouse => KindDescriptor {
                icon: "package",
                accent: "cyan",
            },
            NotificationKind::System => KindDescriptor {
                icon: "settings",
                accent: "slate",
            },
            NotificationKind::Unknown => KindDescriptor {
                icon: "bell",
                accent: "slate",
            },
        }
    }
}

/// Where a notification's action URL points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionTarget {
    Internal(String),
    External(String),
}

impl ActionTarget {
    pub fn parse(url: &str) -> Self {
        if url.starts_with("http://") || url.starts_with("https://") {
            ActionTarget::External(url.to_string())
        } else {
            ActionTarget::Internal(url.to_string())
        }
    }
}

/// Render-time split into the critical band and the rest. Server order is
/// preserved inside each band, nothing is re-sorted.
pub fn split_by_urgency(notifications: &[Notification]) -> (Vec<&Notification>, Vec<&Notification>) {
    let mut critical = Vec::new();
    let mut normal = Vec::new();
    for notification in notifications {
        if notification.priority.is_high() {
            critical.push(notification);
        } else {
            normal.push(notification);
        }
    }
    (critical, normal)
}

#[cfg(test)]
mod tests {
    use super::{ActionTarget, NotificationKind};
    use chrono::{TimeZone, Utc};
    use nexo_api::{Notification, Priority};

    fn note(id: u64, priority: Priority) -> Notification {
        Notification {
            id,
            title: format!("n{id}"),
            message: String::new(),
            kind: "sistema".to_string(),
            priority,
            read: false,
            read_at: None,
            action_url: None,
            related_entity: None,
            created_at: Utc.with_ymd_and_hms(2026, 8, 20, 9, 0, 0).unwrap(),
        }
    }

    #[test]
    fn known_tags_map_to_their_kind() {
        assert_eq!(NotificationKind::from_tag("seguimiento"), NotificationKind::FollowUp);
        assert_eq!(NotificationKind::from_tag("seguimiento_vencido"), NotificationKind::FollowUp);
        assert_eq!(NotificationKind::from_tag("venta"), NotificationKind::Sale);
        assert_eq!(NotificationKind::from_tag("almacén"), NotificationKind::Warehouse);
        assert_eq!(NotificationKind::from_tag("almacen"), NotificationKind::Warehouse);
    }

    #[test]
    fn unknown_tag_falls_back_to_the_bell() {
        let kind = NotificationKind::from_tag("telegrama");
        assert_eq!(kind, NotificationKind::Unknown);
        assert_eq!(kind.descriptor().icon, "bell");
    }

    #[test]
    fn action_urls_split_into_internal_and_external() {
        assert_eq!(
            ActionTarget::parse("/prospectos/41"),
            ActionTarget::Internal("/prospectos/41".to_string())
        );
        assert_eq!(
            ActionTarget::parse("https://pagos.example.com/f/9"),
            ActionTarget::External("https://pagos.example.com/f/9".to_string())
        );
    }

    #[test]
    fn split_keeps_server_order_within_each_band() {
        let list = vec![
            note(1, Priority::Normal),
            note(2, Priority::Critica),
            note(3, Priority::Media),
            note(4, Priority::Alta),
        ];

        let (critical, normal) = super::split_by_urgency(&list);

        let critical_ids: Vec<u64> = critical.iter().map(|n| n.id).collect();
        let normal_ids: Vec<u64> = normal.iter().map(|n| n.id).collect();
        assert_eq!(critical_ids, vec![2, 4]);
        assert_eq!(normal_ids, vec![1, 3]);
    }
}

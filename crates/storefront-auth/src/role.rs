use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Staff role ids issued by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StaffRole {
    Designer,
    Reception,
    HeadOfDesigners,
    Printer,
    Delivery,
    Digital,
    Bill,
    Chaspak,
    ShopRole,
    Laser,
}

impl StaffRole {
    pub fn from_id(id: u64) -> Option<Self> {
        let role = match id {
            1 => StaffRole::Designer,
            2 => StaffRole::Reception,
            3 => StaffRole::HeadOfDesigners,
            4 => StaffRole::Printer,
            5 => StaffRole::Delivery,
            6 => StaffRole::Digital,
            7 => StaffRole::Bill,
            8 => StaffRole::Chaspak,
            9 => StaffRole::ShopRole,
            10 => StaffRole::Laser,
            _ => return None,
        };
        Some(role)
    }

    pub fn id(self) -> u64 {
        match self {
            StaffRole::Designer => 1,
            StaffRole::Reception => 2,
            StaffRole::HeadOfDesigners => 3,
            StaffRole::Printer => 4,
            StaffRole::Delivery => 5,
            StaffRole::Digital => 6,
            StaffRole::Bill => 7,
            StaffRole::Chaspak => 8,
            StaffRole::ShopRole => 9,
            StaffRole::Laser => 10,
        }
    }

    /// Display name used by the backend admin.
    pub fn name(self) -> &'static str {
        match self {
            StaffRole::Designer => "Designer",
            StaffRole::Reception => "Reception",
            StaffRole::HeadOfDesigners => "Head_of_designers",
            StaffRole::Printer => "Printer",
            StaffRole::Delivery => "Delivery",
            StaffRole::Digital => "Digital",
            StaffRole::Bill => "Bill",
            StaffRole::Chaspak => "Chaspak",
            StaffRole::ShopRole => "Shop_role",
            StaffRole::Laser => "Laser",
        }
    }
}

/// Decode the role list stored in the role slot: a JSON array whose first
/// element is the numeric role id.
pub fn decode_role(value: &Value) -> Option<StaffRole> {
    value
        .as_array()?
        .first()?
        .as_u64()
        .and_then(StaffRole::from_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ids_round_trip() {
        for id in 1..=10 {
            assert_eq!(StaffRole::from_id(id).unwrap().id(), id);
        }
        assert!(StaffRole::from_id(0).is_none());
        assert!(StaffRole::from_id(11).is_none());
    }

    #[test]
    fn decodes_first_element() {
        assert_eq!(decode_role(&json!([4])), Some(StaffRole::Printer));
        assert_eq!(decode_role(&json!([2, 4])), Some(StaffRole::Reception));
    }

    #[test]
    fn rejects_non_numeric_or_empty() {
        assert!(decode_role(&json!([])).is_none());
        assert!(decode_role(&json!(["4"])).is_none());
        assert!(decode_role(&json!(4)).is_none());
        assert!(decode_role(&json!({"role": 4})).is_none());
        assert!(decode_role(&json!([-1])).is_none());
    }

    #[test]
    fn names_match_backend() {
        assert_eq!(StaffRole::HeadOfDesigners.name(), "Head_of_designers");
        assert_eq!(StaffRole::ShopRole.name(), "Shop_role");
    }
}

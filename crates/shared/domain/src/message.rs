//! Generic example record: an identifier and a single text field.

use serde::{Deserialize, Serialize};

use crate::constants::MESSAGE_KIND;
use crate::entity::{Entity, EntityId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Message {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub string_data: String,
}

impl Message {
    pub fn new(string_data: impl Into<String>) -> Self {
        Self {
            id: None,
            string_data: string_data.into(),
        }
    }
}

impl Entity for Message {
    const KIND: &'static str = MESSAGE_KIND;

    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = Some(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{FIELD_ID, MESSAGE_FIELD_STRING_DATA};

    #[test]
    fn test_unset_id_is_not_serialized() {
        let doc = bson::to_document(&Message::new("Hello, World!")).unwrap();
        assert!(!doc.contains_key(FIELD_ID));
        assert_eq!(doc.get_str(MESSAGE_FIELD_STRING_DATA).unwrap(), "Hello, World!");
    }

    #[test]
    fn test_assigned_id_is_serialized_as_underscore_id() {
        let mut message = Message::new("x");
        let id = EntityId::new();
        message.set_id(id);

        let doc = bson::to_document(&message).unwrap();
        assert_eq!(doc.get_object_id(FIELD_ID).unwrap(), id);
    }
}

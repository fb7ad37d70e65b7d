use operation::ResponseKey;
use serde_json::{Map, Value};

use super::{ResponseField, ResponseList, ResponseListId, ResponseObject, ResponseObjectId, ResponseValue, ResponseValueId};
use crate::execution::ExecutionError;

/// Arena holding the response of one execution branch.
///
/// Objects and lists record the slot that owns them, set at most once, so a null in a non-null
/// slot can be bubbled up to the nearest nullable ancestor.
#[derive(Debug, Default)]
pub(crate) struct ResponseTree {
    root: ResponseValue,
    objects: Vec<ResponseObject>,
    lists: Vec<ResponseList>,
}

impl ResponseTree {
    pub fn push_object(&mut self, owner: ResponseValueId) -> Result<ResponseObjectId, ExecutionError> {
        let id = ResponseObjectId::from(self.objects.len());
        self.objects.push(ResponseObject {
            fields: Vec::new(),
            invalid_null: false,
            owner: None,
        });
        self.set_object_owner(id, owner)?;
        self.set(owner, ResponseValue::Object { id });
        Ok(id)
    }

    pub fn set_object_owner(&mut self, id: ResponseObjectId, owner: ResponseValueId) -> Result<(), ExecutionError> {
        let object = &mut self[id];
        if object.owner.is_some() {
            return Err(ExecutionError::OwnerAlreadySet);
        }
        object.owner = Some(owner);
        Ok(())
    }

    pub fn push_list(&mut self, owner: ResponseValueId, capacity: usize) -> Result<ResponseListId, ExecutionError> {
        let id = ResponseListId::from(self.lists.len());
        self.lists.push(ResponseList {
            items: Vec::with_capacity(capacity),
            invalid_null: false,
            owner: None,
        });
        self.set_list_owner(id, owner)?;
        self.set(owner, ResponseValue::List { id });
        Ok(id)
    }

    pub fn set_list_owner(&mut self, id: ResponseListId, owner: ResponseValueId) -> Result<(), ExecutionError> {
        let list = &mut self[id];
        if list.owner.is_some() {
            return Err(ExecutionError::OwnerAlreadySet);
        }
        list.owner = Some(owner);
        Ok(())
    }

    /// Adds a not yet resolved field to an object, returning its slot.
    pub fn push_field(&mut self, object_id: ResponseObjectId, key: ResponseKey, nullable: bool) -> ResponseValueId {
        let fields = &mut self[object_id].fields;
        fields.push(ResponseField {
            key,
            value: ResponseValue::Pending,
        });
        ResponseValueId::field(object_id, fields.len() - 1, nullable)
    }

    pub fn push_item(&mut self, list_id: ResponseListId, nullable: bool) -> ResponseValueId {
        let items = &mut self[list_id].items;
        items.push(ResponseValue::Pending);
        ResponseValueId::index(list_id, items.len() - 1, nullable)
    }

    pub fn set(&mut self, slot: ResponseValueId, value: ResponseValue) {
        match slot {
            ResponseValueId::Root => self.root = value,
            ResponseValueId::Field { object_id, index, .. } => {
                self.objects[usize::from(object_id)].fields[index as usize].value = value;
            }
            ResponseValueId::Index { list_id, index, .. } => {
                self.lists[usize::from(list_id)].items[index as usize] = value;
            }
        }
    }

    pub fn get(&self, slot: ResponseValueId) -> &ResponseValue {
        match slot {
            ResponseValueId::Root => &self.root,
            ResponseValueId::Field { object_id, index, .. } => &self[object_id].fields[index as usize].value,
            ResponseValueId::Index { list_id, index, .. } => &self[list_id].items[index as usize],
        }
    }

    /// Replaces the value of `slot` by null, or if the slot does not accept null, invalidates the
    /// containing object or list and continues with the slot owning it. Stops at the first
    /// container already invalidated, its null has already been propagated.
    pub fn propagate_null(&mut self, mut slot: ResponseValueId) {
        loop {
            if slot.is_nullable() {
                self.set(slot, ResponseValue::Null);
                return;
            }
            let owner = match slot {
                ResponseValueId::Root => None,
                ResponseValueId::Field { object_id, .. } => {
                    let object = &mut self[object_id];
                    if object.invalid_null {
                        return;
                    }
                    object.invalid_null = true;
                    object.owner
                }
                ResponseValueId::Index { list_id, .. } => {
                    let list = &mut self[list_id];
                    if list.invalid_null {
                        return;
                    }
                    list.invalid_null = true;
                    list.owner
                }
            };
            match owner {
                Some(owner) => slot = owner,
                None => return,
            }
        }
    }

    /// Whether a value written into `slot` would still be part of the response.
    pub fn is_live(&self, slot: ResponseValueId) -> bool {
        match slot {
            ResponseValueId::Root => true,
            ResponseValueId::Field { object_id, .. } => self.is_object_live(object_id),
            ResponseValueId::Index { list_id, .. } => self.is_list_live(list_id),
        }
    }

    pub fn is_object_live(&self, id: ResponseObjectId) -> bool {
        let object = &self[id];
        !object.invalid_null && object.owner.is_none_or(|owner| self.is_live(owner))
    }

    pub fn is_list_live(&self, id: ResponseListId) -> bool {
        let list = &self[id];
        !list.invalid_null && list.owner.is_none_or(|owner| self.is_live(owner))
    }

    pub fn to_json(&self) -> Value {
        self.value_to_json(&self.root)
    }

    fn value_to_json(&self, value: &ResponseValue) -> Value {
        match value {
            ResponseValue::Pending | ResponseValue::Null => Value::Null,
            ResponseValue::Leaf(value) => value.clone(),
            ResponseValue::List { id } => Value::Array(
                self[*id]
                    .items
                    .iter()
                    .map(|item| self.value_to_json(item))
                    .collect(),
            ),
            ResponseValue::Object { id } => {
                let mut map = Map::with_capacity(self[*id].fields.len());
                for field in &self[*id].fields {
                    // Fields still pending once the branch is drained belong to a later patch.
                    if !matches!(field.value, ResponseValue::Pending) {
                        map.insert(field.key.to_string(), self.value_to_json(&field.value));
                    }
                }
                Value::Object(map)
            }
        }
    }
}

impl std::ops::Index<ResponseObjectId> for ResponseTree {
    type Output = ResponseObject;

    fn index(&self, id: ResponseObjectId) -> &Self::Output {
        &self.objects[usize::from(id)]
    }
}

impl std::ops::IndexMut<ResponseObjectId> for ResponseTree {
    fn index_mut(&mut self, id: ResponseObjectId) -> &mut Self::Output {
        &mut self.objects[usize::from(id)]
    }
}

impl std::ops::Index<ResponseListId> for ResponseTree {
    type Output = ResponseList;

    fn index(&self, id: ResponseListId) -> &Self::Output {
        &self.lists[usize::from(id)]
    }
}

impl std::ops::IndexMut<ResponseListId> for ResponseTree {
    fn index_mut(&mut self, id: ResponseListId) -> &mut Self::Output {
        &mut self.lists[usize::from(id)]
    }
}

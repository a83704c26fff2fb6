//! 세션 컨텍스트(상태) 트리와 세션 상태.
//!
//! 컨텍스트는 아레나(`Vec`)에 저장되고 부모는 인덱스로 가리킨다.
//! 부모는 항상 자식보다 먼저 존재하므로 트리는 구조적으로 비순환이다.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::domain::cmd::CommandTree;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("unknown context id: {0:?}")]
    UnknownContext(StateId),
    #[error("context \"{name}\" already exists under this parent")]
    DuplicateContext { name: String },
    #[error("unknown command collection: {0}")]
    UnknownCollection(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(usize);

impl StateId {
    pub const ROOT: StateId = StateId(0);
}

/// 컨텍스트 하나(예: 하위 메뉴).
#[derive(Debug, Clone)]
pub struct StateNode {
    name: String,
    label: String,
    parent: Option<StateId>,
    inherit: bool,
    collections: Vec<(String, CommandTree)>,
}

impl StateNode {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 프롬프트에 표시되는 이름.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn parent(&self) -> Option<StateId> {
        self.parent
    }

    /// 부모 컨텍스트의 명령도 보이는지 여부.
    pub fn inherits(&self) -> bool {
        self.inherit
    }

    pub fn collection_names(&self) -> impl Iterator<Item = &str> {
        self.collections.iter().map(|(name, _)| name.as_str())
    }

    /// 같은 이름이 있으면 제자리에서 교체하고, 없으면 뒤에 추가한다.
    pub fn extend(&mut self, collection: &str, tree: CommandTree) {
        match self.collections.iter_mut().find(|(name, _)| name == collection) {
            Some(slot) => slot.1 = tree,
            None => self.collections.push((collection.to_string(), tree)),
        }
    }

    pub fn remove(&mut self, collection: &str) -> Option<CommandTree> {
        let idx = self
            .collections
            .iter()
            .position(|(name, _)| name == collection)?;
        Some(self.collections.remove(idx).1)
    }

    /// 등록 순서대로 별칭을 펼쳐 병합한 트리.
    pub fn merged(&self) -> CommandTree {
        let mut out = CommandTree::new();
        for (_, tree) in &self.collections {
            out.merge(tree.with_aliases());
        }
        out
    }
}

#[derive(Debug, Clone)]
pub struct StateTree {
    nodes: Vec<StateNode>,
}

impl StateTree {
    pub fn new(root_label: &str) -> Self {
        Self {
            nodes: vec![StateNode {
                name: String::new(),
                label: root_label.to_string(),
                parent: None,
                inherit: false,
                collections: Vec::new(),
            }],
        }
    }

    pub fn root(&self) -> StateId {
        StateId::ROOT
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn add(
        &mut self,
        parent: StateId,
        name: &str,
        label: &str,
        inherit: bool,
    ) -> Result<StateId, SessionError> {
        self.get(parent).ok_or(SessionError::UnknownContext(parent))?;
        if self.child(parent, name).is_some() {
            return Err(SessionError::DuplicateContext {
                name: name.to_string(),
            });
        }

        let id = StateId(self.nodes.len());
        self.nodes.push(StateNode {
            name: name.to_string(),
            label: label.to_string(),
            parent: Some(parent),
            inherit,
            collections: Vec::new(),
        });
        Ok(id)
    }

    pub fn get(&self, id: StateId) -> Option<&StateNode> {
        self.nodes.get(id.0)
    }

    pub fn get_mut(&mut self, id: StateId) -> Option<&mut StateNode> {
        self.nodes.get_mut(id.0)
    }

    pub fn node(&self, id: StateId) -> Result<&StateNode, SessionError> {
        self.get(id).ok_or(SessionError::UnknownContext(id))
    }

    pub fn node_mut(&mut self, id: StateId) -> Result<&mut StateNode, SessionError> {
        self.get_mut(id).ok_or(SessionError::UnknownContext(id))
    }

    pub fn parent(&self, id: StateId) -> Option<StateId> {
        self.get(id).and_then(StateNode::parent)
    }

    pub fn child(&self, parent: StateId, name: &str) -> Option<StateId> {
        self.children(parent).find(|id| self.nodes[id.0].name == name)
    }

    pub fn children(&self, parent: StateId) -> impl Iterator<Item = StateId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(move |(_, n)| n.parent == Some(parent))
            .map(|(idx, _)| StateId(idx))
    }

    /// 루트에서 `id`까지의 경로(양끝 포함).
    pub fn ancestry(&self, id: StateId) -> Vec<StateId> {
        let mut out = Vec::new();
        let mut cursor = self.get(id).map(|_| id);
        while let Some(current) = cursor {
            out.push(current);
            cursor = self.parent(current);
        }
        out.reverse();
        out
    }

    /// 루트를 제외한 컨텍스트 라벨 목록.
    pub fn path_labels(&self, id: StateId) -> Vec<&str> {
        self.ancestry(id)
            .into_iter()
            .skip(1)
            .map(|id| self.nodes[id.0].label.as_str())
            .collect()
    }

    /// 상속 규칙을 적용한 `id` 컨텍스트의 유효 명령 트리.
    /// 상속이 끊긴 지점 위의 조상은 제외하고, 깊은 컨텍스트가 이긴다.
    pub fn effective_tree(&self, id: StateId) -> CommandTree {
        let mut visible = Vec::new();
        let mut cursor = self.get(id).map(|_| id);
        while let Some(current) = cursor {
            visible.push(current);
            let node = &self.nodes[current.0];
            cursor = if node.inherit { node.parent } else { None };
        }

        let mut out = CommandTree::new();
        for id in visible.into_iter().rev() {
            out.merge(self.nodes[id.0].merged());
        }
        out
    }
}

/// 명령 핸들러와 사용 가능 조건이 공유하는 세션 상태.
#[derive(Debug, Clone)]
pub struct SessionState {
    current: StateId,
    vars: Map<String, Value>,
}

impl SessionState {
    pub fn new(current: StateId) -> Self {
        Self {
            current,
            vars: Map::new(),
        }
    }

    /// 현재 컨텍스트. 세션은 항상 정확히 하나의 컨텍스트에 있다.
    pub fn current(&self) -> StateId {
        self.current
    }

    pub(crate) fn set_current(&mut self, id: StateId) {
        self.current = id;
    }

    pub fn set<T: Serialize>(&mut self, key: &str, value: T) -> serde_json::Result<()> {
        self.vars.insert(key.to_string(), serde_json::to_value(value)?);
        Ok(())
    }

    /// 값이 없거나 타입이 맞지 않으면 `None`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.vars.get(key)?;
        serde_json::from_value(value.clone()).ok()
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.vars.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    pub fn vars(&self) -> &Map<String, Value> {
        &self.vars
    }
}

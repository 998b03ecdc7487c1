//! Host-owned registry of bound tables.
//!
//! Instances live from `bind` until `unbind` (or until the registry is
//! dropped). Rebinding a table id replaces its instance wholesale.

use std::collections::HashMap;

use dtodata_core::config::SettingsSource;
use dtodata_core::error::Result;
use dtodata_core::id::TableId;
use dtodata_core::request::TableRequest;

use crate::instance::Instance;
use crate::normalize::TableResult;
use crate::transport::Transport;

#[derive(Debug, Default)]
pub struct InstanceRegistry {
    instances: HashMap<TableId, Instance>,
}

impl InstanceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `source` and bind the table.
    ///
    /// `SettingsSource::None` binds nothing and returns `Ok(None)`; any
    /// instance previously bound under `id` is left as is.
    pub fn bind(
        &mut self,
        id: impl Into<TableId>,
        source: &SettingsSource,
    ) -> Result<Option<&mut Instance>> {
        let id = id.into();
        let Some(settings) = source.resolve()? else {
            return Ok(None);
        };

        let instance = Instance::new(id.clone(), settings)?;
        if self.instances.insert(id.clone(), instance).is_some() {
            tracing::debug!(table = %id, "rebinding table, previous instance dropped");
        }
        Ok(self.instances.get_mut(&id))
    }

    /// `bind`, then install `callback` on the new instance.
    pub fn bind_with_callback(
        &mut self,
        id: impl Into<TableId>,
        source: &SettingsSource,
        callback: impl Fn(&Instance) + Send + Sync + 'static,
    ) -> Result<Option<&mut Instance>> {
        let instance = self.bind(id, source)?;
        Ok(instance.map(|inst| {
            inst.set_callback(callback);
            inst
        }))
    }

    pub fn get(&self, id: &TableId) -> Option<&Instance> {
        self.instances.get(id)
    }

    pub fn get_mut(&mut self, id: &TableId) -> Option<&mut Instance> {
        self.instances.get_mut(id)
    }

    /// Drop the table's instance, e.g. when the table is destroyed.
    pub fn unbind(&mut self, id: &TableId) -> Option<Instance> {
        self.instances.remove(id)
    }

    pub fn contains(&self, id: &TableId) -> bool {
        self.instances.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TableId, &Instance)> {
        self.instances.iter()
    }

    /// Route a table's data request to its instance.
    pub fn fetch(
        &mut self,
        id: &TableId,
        request: &TableRequest,
        transport: &dyn Transport,
    ) -> TableResult {
        match self.instances.get_mut(id) {
            Some(instance) => instance.fetch(request, transport),
            None => {
                tracing::warn!(table = %id, "fetch for unbound table");
                TableResult::error(format!("table '{}' is not bound", id.as_str()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dtodata_core::config::SettingsPatch;

    #[test]
    fn bind_resolves_each_source_shape() {
        let mut reg = InstanceRegistry::new();

        assert!(reg.bind("none", &SettingsSource::None).unwrap().is_none());
        assert!(!reg.contains(&TableId::from("none")));

        let inst = reg
            .bind("url", &SettingsSource::from("http://svc/People"))
            .unwrap()
            .unwrap();
        assert_eq!(inst.settings().url, "http://svc/People");

        let patch = SettingsPatch {
            url: Some("http://svc/Orders".into()),
            use_objects: Some(false),
            ..Default::default()
        };
        let inst = reg.bind("full", &SettingsSource::Full(patch)).unwrap().unwrap();
        assert!(!inst.settings().use_objects);

        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn rebinding_replaces_the_instance() {
        let mut reg = InstanceRegistry::new();
        reg.bind("t", &SettingsSource::from("http://a")).unwrap();
        reg.bind("t", &SettingsSource::from("http://b")).unwrap();
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.get(&TableId::from("t")).unwrap().settings().url, "http://b");
    }

    #[test]
    fn invalid_settings_do_not_bind() {
        let mut reg = InstanceRegistry::new();
        let patch = SettingsPatch {
            paging_cache: Some(0),
            ..Default::default()
        };
        assert!(reg.bind("t", &SettingsSource::Full(patch)).is_err());
        assert!(reg.is_empty());
    }

    #[test]
    fn bind_with_callback_installs_it() {
        use crate::transport::{MemoryTransport, TransportResponse};
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut reg = InstanceRegistry::new();
        reg.bind_with_callback("t", &SettingsSource::from("http://a"), move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

        let transport = MemoryTransport::new()
            .respond_with(TransportResponse::ok(r#"{"@odata.count": 0, "value": []}"#));
        let r = reg.fetch(&TableId::from("t"), &TableRequest::default(), &transport);
        assert!(!r.is_error());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unbind_removes_and_fetch_reports_unbound() {
        let mut reg = InstanceRegistry::new();
        reg.bind("t", &SettingsSource::from("http://a")).unwrap();
        let id = TableId::from("t");
        assert!(reg.unbind(&id).is_some());
        assert!(reg.is_empty());

        let transport = crate::transport::MemoryTransport::new();
        let r = reg.fetch(&id, &TableRequest::default(), &transport);
        assert!(r.is_error());
        assert!(transport.requests().is_empty());
    }
}

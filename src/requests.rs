use crate::ServiceInfo;

/// Information about an active request.
#[derive(Clone, Debug, Default)]
pub struct RequestInfo {
    service_path: Vec<ServiceInfo>,
}

impl RequestInfo {
    /// Creates a new, empty instance of [`RequestInfo`].
    #[must_use]
    pub fn new() -> Self {
        RequestInfo::default()
    }

    /// Creates a new child instance of [`RequestInfo`] with the given service
    /// appended to the end of the request path.
    #[must_use]
    pub fn with_request(&self, service: ServiceInfo) -> Self {
        let mut child = self.clone();
        child.service_path.push(service);
        child
    }

    /// Gets the current request path: the implementations being built, from
    /// the outermost request inwards.
    #[must_use]
    pub fn service_path(&self) -> &[ServiceInfo] {
        &self.service_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_requests_extend_the_path() {
        let root = RequestInfo::new();
        let child = root.with_request(ServiceInfo::of::<u8>());
        let grandchild = child.with_request(ServiceInfo::of::<u16>());

        assert!(root.service_path().is_empty());
        assert_eq!(&[ServiceInfo::of::<u8>()], child.service_path());
        assert_eq!(
            &[ServiceInfo::of::<u8>(), ServiceInfo::of::<u16>()],
            grandchild.service_path()
        );
    }
}

use super::{Desired, Ensure, Provider};
use crate::eapi::Node;
use crate::error::Result;
use crate::modules::staticroute::{self, StaticRoute, DEFAULT_DISTANCE, DEFAULT_TAG};
use serde::{Deserialize, Serialize};

/// One static route, named `<prefix>/<masklen>/<nexthop>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StaticRouteResource {
    pub name: String,
    #[serde(default)]
    pub ensure: Ensure,
    pub distance: Option<u8>,
    pub tag: Option<u32>,
    pub route_name: Option<String>,
}

impl Desired for StaticRouteResource {
    fn identity(&self) -> String {
        self.name.clone()
    }

    fn ensure(&self) -> Ensure {
        self.ensure
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticRoutePending {
    pub ensure: Option<Ensure>,
    pub distance: Option<u8>,
    pub tag: Option<u32>,
    /// `Some(None)` removes the name
    pub route_name: Option<Option<String>>,
}

#[derive(Debug)]
pub struct StaticRouteProvider {
    route: StaticRoute,
    exists: bool,
}

impl StaticRouteProvider {
    fn stage(&self, desired: &StaticRouteResource, pending: &mut StaticRoutePending) -> Vec<&'static str> {
        let mut changed = Vec::new();
        if let Some(distance) = desired.distance {
            if distance != self.route.distance {
                pending.distance = Some(distance);
                changed.push("distance");
            }
        }
        if let Some(tag) = desired.tag {
            if tag != self.route.tag {
                pending.tag = Some(tag);
                changed.push("tag");
            }
        }
        if let Some(name) = &desired.route_name {
            let name = Some(name.clone()).filter(|n| !n.is_empty());
            if name != self.route.route_name {
                pending.route_name = Some(name);
                changed.push("route_name");
            }
        }
        changed
    }
}

/// The route once `pending` is merged over `current`.
pub fn merge_route(current: &StaticRoute, pending: &StaticRoutePending) -> StaticRoute {
    StaticRoute {
        distance: pending.distance.unwrap_or(current.distance),
        tag: pending.tag.unwrap_or(current.tag),
        route_name: pending
            .route_name
            .clone()
            .unwrap_or_else(|| current.route_name.clone()),
        ..current.clone()
    }
}

/// Commands that realize `pending`. `current` is the observed route, if
/// any; `base` carries the identity fields for a new one.
pub fn flush_route(
    base: &StaticRoute,
    current: Option<&StaticRoute>,
    pending: &StaticRoutePending,
) -> Result<Vec<String>> {
    if pending.ensure == Some(Ensure::Absent) {
        return Ok(current.map(staticroute::remove_route).unwrap_or_default());
    }
    let desired = merge_route(current.unwrap_or(base), pending);
    desired.validate()?;
    Ok(staticroute::update_route(current, &desired))
}

impl Provider for StaticRouteProvider {
    const RESOURCE_TYPE: &'static str = "static_route";
    type Desired = StaticRouteResource;
    type Pending = StaticRoutePending;

    fn instances(node: &Node) -> Result<Vec<Self>> {
        Ok(staticroute::getall(node)?
            .into_values()
            .map(|route| Self {
                route,
                exists: true,
            })
            .collect())
    }

    fn absent(desired: &StaticRouteResource) -> Result<Self> {
        let (prefix, masklen, next_hop) = staticroute::parse_identity(&desired.name)?;
        Ok(Self {
            route: StaticRoute {
                prefix,
                masklen,
                next_hop,
                distance: DEFAULT_DISTANCE,
                tag: DEFAULT_TAG,
                route_name: None,
            },
            exists: false,
        })
    }

    fn name(&self) -> String {
        self.route.identity()
    }

    fn exists(&self) -> bool {
        self.exists
    }

    fn create(
        &mut self,
        _node: &Node,
        desired: &StaticRouteResource,
        pending: &mut StaticRoutePending,
    ) -> Result<()> {
        pending.ensure = Some(Ensure::Present);
        self.stage(desired, pending);
        Ok(())
    }

    fn destroy(&mut self, _node: &Node, pending: &mut StaticRoutePending) -> Result<()> {
        pending.ensure = Some(Ensure::Absent);
        Ok(())
    }

    fn sync(
        &mut self,
        _node: &Node,
        desired: &StaticRouteResource,
        pending: &mut StaticRoutePending,
    ) -> Result<Vec<&'static str>> {
        Ok(self.stage(desired, pending))
    }

    fn flush(&mut self, node: &Node, pending: StaticRoutePending) -> Result<()> {
        if pending == StaticRoutePending::default() {
            return Ok(());
        }
        let current = self.exists.then_some(&self.route);
        node.apply(flush_route(&self.route, current, &pending)?)?;

        if pending.ensure == Some(Ensure::Absent) {
            self.exists = false;
        } else {
            self.route = merge_route(&self.route, &pending);
            self.exists = true;
        }
        Ok(())
    }
}

//! Access decision engine.
//!
//! `AccessHandler` builds [`Wrapper`]s: chains of decision layers placed in
//! front of a protected operation. Invoking a wrapper evaluates every layer,
//! outermost first, and only then runs the operation. Any failure stops the
//! chain before the operation is called.

use crate::audit::{AccessAudit, AuditEvent, Procedure};
use crate::{match_role, AccessError, AccessResult, DecisionContext, IdentityResolver, OutcomeClass, RoleAccess, UserDirectory};
use agora_core::{Identity, UserKey};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// What a layer checks after role membership.
#[derive(Debug, Clone)]
enum Check {
    Role,
    Ownership(Option<UserKey>),
    Assignment(UserKey),
}

impl Check {
    fn procedure(&self) -> Procedure {
        match self {
            Self::Role => Procedure::Role,
            Self::Ownership(_) => Procedure::Ownership,
            Self::Assignment(_) => Procedure::Assignment,
        }
    }

    fn target(&self) -> Option<&UserKey> {
        match self {
            Self::Role => None,
            Self::Ownership(owner) => owner.as_ref(),
            Self::Assignment(target) => Some(target),
        }
    }
}

/// One decision procedure inside a wrapper.
#[derive(Debug, Clone)]
struct Layer {
    credential: Option<String>,
    alternatives: Option<Vec<RoleAccess>>,
    check: Check,
    strip_context: bool,
}

/// Authorization decision engine.
///
/// Holds no per-request state; clone it freely or build one per request.
#[derive(Clone)]
pub struct AccessHandler {
    resolver: Arc<dyn IdentityResolver>,
    directory: Arc<dyn UserDirectory>,
    audit: Option<Arc<AccessAudit>>,
}

impl AccessHandler {
    /// Creates an engine over the given collaborators.
    pub fn new(resolver: Arc<dyn IdentityResolver>, directory: Arc<dyn UserDirectory>) -> Self {
        Self {
            resolver,
            directory,
            audit: None,
        }
    }

    /// Attaches an audit service.
    #[must_use]
    pub fn with_audit(mut self, audit: Arc<AccessAudit>) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Gates an operation on role membership alone.
    ///
    /// The layer strips the decision context; call [`Wrapper::keep_context`]
    /// to hand it to a nested decision or to the operation.
    pub fn require_role(&self, credential: Option<&str>, alternatives: Option<Vec<RoleAccess>>) -> Wrapper {
        self.wrap(Layer {
            credential: credential.map(str::to_owned),
            alternatives,
            check: Check::Role,
            strip_context: true,
        })
    }

    /// Gates an operation on role membership and ownership of a resource.
    ///
    /// `owner_key` is `None` for resources nobody owns.
    pub fn require_ownership(
        &self,
        owner_key: Option<UserKey>,
        credential: Option<&str>,
        alternatives: Option<Vec<RoleAccess>>,
        strip_context: bool,
    ) -> Wrapper {
        self.wrap(Layer {
            credential: credential.map(str::to_owned),
            alternatives,
            check: Check::Ownership(owner_key),
            strip_context,
        })
    }

    /// Gates a role change on the target user's current role.
    pub fn require_assignable(
        &self,
        target_key: impl Into<UserKey>,
        credential: Option<&str>,
        alternatives: Option<Vec<RoleAccess>>,
        strip_context: bool,
    ) -> Wrapper {
        self.wrap(Layer {
            credential: credential.map(str::to_owned),
            alternatives,
            check: Check::Assignment(target_key.into()),
            strip_context,
        })
    }

    fn wrap(&self, layer: Layer) -> Wrapper {
        Wrapper {
            handler: self.clone(),
            layers: vec![layer],
            seed: None,
        }
    }

    async fn evaluate(&self, layer: &Layer, inherited: Option<DecisionContext>) -> AccessResult<DecisionContext> {
        let procedure = layer.check.procedure();
        let target = layer.check.target();

        let (identity, role) = match inherited {
            Some(context) => context.into_parts(),
            None => {
                let identity = self
                    .find_identity(layer.credential.as_deref())
                    .await
                    .map_err(|e| self.fail(procedure, None, target, e))?;
                let role = find_role(layer.alternatives.as_deref(), &identity)
                    .map_err(|e| self.fail(procedure, Some(&identity), target, e))?;
                (identity, role)
            }
        };

        if let Err(e) = self.check(&layer.check, &identity, &role).await {
            return Err(self.fail(procedure, Some(&identity), target, e));
        }

        debug!(
            user_key = %identity.key,
            role = %identity.role,
            procedure = ?procedure,
            "Access granted"
        );
        if let Some(audit) = &self.audit {
            audit.record(&AuditEvent::allowed(procedure, &identity, target));
        }

        Ok(DecisionContext::new(identity, role))
    }

    async fn find_identity(&self, credential: Option<&str>) -> AccessResult<Identity> {
        match credential {
            Some(credential) => self.resolver.resolve(credential).await,
            None => Err(AccessError::EngineMisconfiguration(
                "no credential or resolved identity was supplied".to_string(),
            )),
        }
    }

    async fn check(&self, check: &Check, identity: &Identity, role: &RoleAccess) -> AccessResult<()> {
        match check {
            Check::Role => Ok(()),
            Check::Ownership(owner_key) => {
                if role.check_owner_access(identity, owner_key.as_ref()) {
                    Ok(())
                } else {
                    Err(AccessError::OwnershipDenied)
                }
            }
            Check::Assignment(target_key) => {
                if target_key.as_str().is_empty() {
                    return Err(AccessError::EngineMisconfiguration(
                        "assignment decision without a target key".to_string(),
                    ));
                }
                let target = self
                    .directory
                    .user_by_key(target_key)
                    .await?
                    .ok_or_else(|| AccessError::TargetNotFound(target_key.clone()))?;

                if role.check_assignable(&target) {
                    Ok(())
                } else {
                    Err(AccessError::AssignmentDenied { target_role: target.role })
                }
            }
        }
    }

    fn fail(
        &self,
        procedure: Procedure,
        identity: Option<&Identity>,
        target: Option<&UserKey>,
        err: AccessError,
    ) -> AccessError {
        let user_key = identity.map(|i| i.key.as_str()).unwrap_or("-");
        match err.class() {
            OutcomeClass::Verification => {
                error!(user_key, procedure = ?procedure, error = %err, "Access verification failed");
            }
            _ => {
                warn!(user_key, procedure = ?procedure, code = err.code(), "Access denied");
            }
        }
        if let Some(audit) = &self.audit {
            audit.record(&AuditEvent::failed(procedure, identity, target, &err));
        }
        err
    }
}

fn find_role(alternatives: Option<&[RoleAccess]>, identity: &Identity) -> AccessResult<RoleAccess> {
    match alternatives {
        Some(alternatives) => match_role(alternatives, identity).cloned(),
        None => Err(AccessError::EngineMisconfiguration(
            "no list of role alternatives was supplied".to_string(),
        )),
    }
}

/// Interception chain in front of a protected operation.
///
/// Layers run outermost first. A layer that keeps its context hands it to the
/// next layer, which then reuses the identity and matched role instead of
/// resolving them again.
#[must_use = "a wrapper does nothing until invoked"]
pub struct Wrapper {
    handler: AccessHandler,
    layers: Vec<Layer>,
    seed: Option<DecisionContext>,
}

impl Wrapper {
    /// Keeps the decision context of the innermost layer instead of stripping it.
    pub fn keep_context(mut self) -> Self {
        if let Some(layer) = self.layers.last_mut() {
            layer.strip_context = false;
        }
        self
    }

    /// Places `inner` inside this wrapper.
    ///
    /// `inner` runs after every layer of `self`. Its seed context, if any, is discarded.
    pub fn nest(mut self, inner: Wrapper) -> Self {
        self.layers.extend(inner.layers);
        self
    }

    /// Seeds the chain with a context from an enclosing decision.
    pub fn with_context(mut self, context: DecisionContext) -> Self {
        self.seed = Some(context);
        self
    }

    /// Runs every layer and returns what the innermost one forwards.
    ///
    /// # Errors
    /// Returns the first failure; later layers are not evaluated.
    pub async fn decide(&self) -> AccessResult<Option<DecisionContext>> {
        let mut forwarded = self.seed.clone();
        for layer in &self.layers {
            let context = self.handler.evaluate(layer, forwarded.take()).await?;
            if !layer.strip_context {
                forwarded = Some(context);
            }
        }
        Ok(forwarded)
    }

    /// Decides, then runs `op` without any decision state.
    ///
    /// # Errors
    /// Access failures are converted into `E`; errors from `op` pass through unchanged.
    pub async fn invoke<F, Fut, T, E>(self, op: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<AccessError>,
    {
        self.decide().await?;
        op().await
    }

    /// Decides, then runs `op` with the forwarded context.
    ///
    /// `op` receives `Some` only when the innermost layer keeps its context.
    ///
    /// # Errors
    /// Access failures are converted into `E`; errors from `op` pass through unchanged.
    pub async fn invoke_with<F, Fut, T, E>(self, op: F) -> Result<T, E>
    where
        F: FnOnce(Option<DecisionContext>) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<AccessError>,
    {
        let forwarded = self.decide().await?;
        op(forwarded).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AuthFailure, MemoryDirectory, Owner};
    use agora_core::RoleLabel;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Maps credentials straight to identities and counts lookups.
    struct StaticResolver {
        identities: HashMap<String, Identity>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl IdentityResolver for StaticResolver {
        async fn resolve(&self, credential: &str) -> AccessResult<Identity> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.identities
                .get(credential)
                .cloned()
                .ok_or(AccessError::AuthenticationFailure(AuthFailure::Malformed("unknown".into())))
        }
    }

    fn engine() -> (AccessHandler, Arc<StaticResolver>) {
        let resolver = Arc::new(StaticResolver {
            identities: HashMap::from([
                ("tok-u1".to_string(), Identity::new("u1", RoleLabel::User)),
                ("tok-a1".to_string(), Identity::new("a1", RoleLabel::Admin)),
            ]),
            calls: AtomicUsize::new(0),
        });
        let directory = Arc::new(MemoryDirectory::from_iter([Identity::new("t1", RoleLabel::User)]));
        (AccessHandler::new(resolver.clone(), directory), resolver)
    }

    #[tokio::test]
    async fn test_missing_credential_is_misconfiguration() {
        let (handler, _) = engine();
        let result = handler
            .require_role(None, Some(vec![RoleAccess::new(RoleLabel::User)]))
            .decide()
            .await;

        assert!(matches!(result, Err(AccessError::EngineMisconfiguration(_))));
    }

    #[tokio::test]
    async fn test_missing_alternatives_is_misconfiguration() {
        let (handler, _) = engine();
        let result = handler.require_role(Some("tok-u1"), None).decide().await;

        assert!(matches!(result, Err(AccessError::EngineMisconfiguration(_))));
    }

    #[tokio::test]
    async fn test_resolver_rejection_is_authentication_failure() {
        let (handler, _) = engine();
        let err = handler
            .require_role(Some("forged"), Some(vec![RoleAccess::new(RoleLabel::User)]))
            .decide()
            .await
            .unwrap_err();

        assert_eq!(err.class(), OutcomeClass::Authentication);
    }

    #[tokio::test]
    async fn test_nested_layer_reuses_identity() {
        let (handler, resolver) = engine();

        let wrapper = handler
            .require_role(Some("tok-u1"), Some(vec![RoleAccess::new(RoleLabel::User).owners([Owner::Own])]))
            .keep_context()
            .nest(handler.require_ownership(Some(UserKey::from("u1")), None, None, true));

        assert_eq!(wrapper.decide().await.unwrap(), None);
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stripping_outer_forces_inner_resolution() {
        let (handler, _) = engine();

        // The outer layer strips, so the inner one has neither context nor credential.
        let result = handler
            .require_role(Some("tok-u1"), Some(vec![RoleAccess::new(RoleLabel::User)]))
            .nest(handler.require_ownership(Some(UserKey::from("u1")), None, None, true))
            .decide()
            .await;

        assert!(matches!(result, Err(AccessError::EngineMisconfiguration(_))));
    }

    #[tokio::test]
    async fn test_seeded_context_skips_resolver() {
        let (handler, resolver) = engine();
        let context = DecisionContext::new(
            Identity::new("a1", RoleLabel::Admin),
            RoleAccess::new(RoleLabel::Admin),
        );

        handler
            .require_assignable("t1", None, None, true)
            .with_context(context)
            .decide()
            .await
            .unwrap();

        assert_eq!(resolver.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_target_key_is_misconfiguration() {
        let (handler, _) = engine();
        let result = handler
            .require_assignable("", Some("tok-a1"), Some(vec![RoleAccess::new(RoleLabel::Admin)]), true)
            .decide()
            .await;

        assert!(matches!(result, Err(AccessError::EngineMisconfiguration(_))));
    }

    #[tokio::test]
    async fn test_invoke_with_keeps_context() {
        let (handler, _) = engine();
        let seen = handler
            .require_role(Some("tok-a1"), Some(vec![RoleAccess::new(RoleLabel::Admin)]))
            .keep_context()
            .invoke_with(|context| async move { Ok::<_, AccessError>(context) })
            .await
            .unwrap();

        let context = seen.expect("context kept");
        assert_eq!(context.identity().key, UserKey::from("a1"));
        assert_eq!(context.role().name(), RoleLabel::Admin);
    }
}

pub mod fields;

use crate::catalog::{self, CatalogEntry};
use crate::config::{
    Fallback, ShadowsocksClient, Sniffing, TrojanClient, VlessClient, VmessClient,
};
use crate::error::{SynthError, ValidationError};
use crate::keys::{self, RealityKeypair};
use crate::model::{
    ClientParams, InboundSpec, ProtocolKind, RealityParams, SecurityKind, ShadowsocksMethod,
    TlsParams,
};
use rand::Rng;
use std::collections::{BTreeSet, HashSet};
use tracing::debug;

/// Host-specific limits applied on top of the syntactic rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationPolicy {
    pub reserved_ports: BTreeSet<u16>,
    pub min_secret_len: usize,
}

impl Default for ValidationPolicy {
    /// SSH, DNS, the 3x-ui panel, the local Clash API and the Xray API port.
    fn default() -> Self {
        Self {
            reserved_ports: [22u16, 53, 2053, 9090, 10085].into_iter().collect(),
            min_secret_len: 8,
        }
    }
}

/// An [`InboundSpec`] that passed validation, with every generated value
/// (ids, passwords, keys, short ids) already filled in. Builders consume
/// this and cannot fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedInbound {
    pub entry: CatalogEntry,
    pub tag: String,
    pub listen: Option<String>,
    pub port: u16,
    pub clients: ClientSet,
    pub transport: ValidatedTransport,
    pub tls: Option<ValidatedTls>,
    pub reality: Option<ValidatedReality>,
    pub fallbacks: Vec<Fallback>,
    pub sniffing: Option<Sniffing>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientSet {
    Vless(Vec<VlessClient>),
    Vmess(Vec<VmessClient>),
    Trojan(Vec<TrojanClient>),
    Shadowsocks {
        method: ShadowsocksMethod,
        server_psk: Option<String>,
        clients: Vec<ShadowsocksClient>,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidatedTransport {
    pub path: Option<String>,
    pub host: Option<String>,
    pub service_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedTls {
    pub server_name: String,
    /// `(certificate_file, key_file)`; `None` means derive from the domain.
    pub certificate: Option<(String, String)>,
    pub alpn: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedReality {
    pub dest: String,
    pub dest_host: String,
    pub server_names: Vec<String>,
    pub keypair: RealityKeypair,
    pub short_ids: Vec<String>,
    pub fingerprint: String,
    pub xver: u8,
}

/// Collects field errors for one spec under a common path prefix.
struct Collector {
    prefix: String,
    errors: Vec<SynthError>,
}

impl Collector {
    fn new(index: usize) -> Self {
        Self {
            prefix: format!("inbounds[{}]", index),
            errors: Vec::new(),
        }
    }

    fn push(&mut self, e: ValidationError) {
        self.errors.push(SynthError::Field(e.scoped(&self.prefix)));
    }

    fn take<T>(&mut self, r: Result<T, ValidationError>) -> Option<T> {
        match r {
            Ok(v) => Some(v),
            Err(e) => {
                self.push(e);
                None
            }
        }
    }
}

/// Validates one spec against the catalog and the field rules, collecting
/// every problem rather than stopping at the first.
pub fn validate_spec<R: Rng>(
    spec: &InboundSpec,
    index: usize,
    policy: &ValidationPolicy,
    rng: &mut R,
) -> Result<ValidatedInbound, Vec<SynthError>> {
    let mut c = Collector::new(index);

    let port = c.take(fields::port("port", spec.port, &policy.reserved_ports));
    let tag = c.take(fields::tag("tag", &spec.tag));
    let listen = match spec.listen.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(addr) => c.take(fields::listen_address("listen", addr)),
        None => None,
    };

    let entry = match catalog::lookup(spec.protocol, spec.transport, spec.security) {
        Ok(entry) => entry,
        Err(combination) => {
            debug!("inbounds[{}] rejected by catalog: {}", index, combination);
            c.errors.push(SynthError::UnsupportedCombination {
                index,
                tag: spec.tag.clone(),
                combination,
            });
            return Err(c.errors);
        }
    };

    check_presence(&mut c, spec, entry);

    let clients = validate_clients(&mut c, spec, policy, rng);
    let transport = validate_transport(&mut c, spec);
    let tls = match (&spec.tls, spec.security) {
        (Some(tls), SecurityKind::Tls) => validate_tls(&mut c, tls),
        _ => None,
    };
    let reality = match (&spec.reality, spec.security) {
        (Some(reality), SecurityKind::Reality) => validate_reality(&mut c, reality, rng),
        _ => None,
    };
    let fallbacks = match port {
        Some(own_port) if entry.accepts_fallbacks() => validate_fallbacks(&mut c, spec, own_port),
        _ => Vec::new(),
    };
    let sniffing = spec.sniffing.as_ref().and_then(|s| {
        if s.enabled && s.dest_override.is_empty() {
            c.push(ValidationError::new(
                "sniffing.dest_override",
                "must list at least one protocol when sniffing is enabled",
            ));
            return None;
        }
        let mut dest_override = Vec::with_capacity(s.dest_override.len());
        for target in &s.dest_override {
            if !dest_override.contains(target) {
                dest_override.push(*target);
            }
        }
        Some(Sniffing {
            enabled: s.enabled,
            dest_override,
        })
    });

    match (port, tag, clients, c.errors.is_empty()) {
        (Some(port), Some(tag), Some(clients), true) => Ok(ValidatedInbound {
            entry: *entry,
            tag,
            listen,
            port,
            clients,
            transport,
            tls,
            reality,
            fallbacks,
            sniffing,
        }),
        _ => Err(c.errors),
    }
}

/// Required fields come from the catalog; blocks the catalog does not list
/// for this combination are refused instead of silently dropped.
///
/// A blank required value is reported here only. The field validators skip
/// blank values so each problem shows up once.
fn check_presence(c: &mut Collector, spec: &InboundSpec, entry: &CatalogEntry) {
    for field in entry.required_fields() {
        // Checked for every spec before the catalog lookup.
        if matches!(field.name, "port" | "tag") {
            continue;
        }
        if !spec.field_present(field.name) {
            c.push(ValidationError::new(
                field.name,
                format!("is required for {}", entry.label()),
            ));
        }
    }

    let mut supplied: Vec<&str> = Vec::new();
    if spec.tls.is_some() {
        supplied.push("tls");
    }
    if spec.reality.is_some() {
        supplied.push("reality");
    }
    if !spec.fallbacks.is_empty() {
        supplied.push("fallbacks");
    }
    for name in ["transport_opts.path", "transport_opts.host", "transport_opts.service_name"] {
        if spec.field_present(name) {
            supplied.push(name);
        }
    }
    for name in supplied {
        if !entry.permits(name) {
            c.push(ValidationError::new(
                name,
                format!("is not used by {}", entry.label()),
            ));
        }
    }
}

const VLESS_KEYS: &[&str] = &["id", "flow", "email"];
const VMESS_KEYS: &[&str] = &["id", "alter_id", "email"];
const TROJAN_KEYS: &[&str] = &["password", "email"];
const SHADOWSOCKS_KEYS: &[&str] = &["method", "password", "email"];

fn supplied_keys(client: &ClientParams) -> Vec<&'static str> {
    let mut keys = Vec::new();
    if client.id.is_some() {
        keys.push("id");
    }
    if client.flow.is_some() {
        keys.push("flow");
    }
    if client.alter_id.is_some() {
        keys.push("alter_id");
    }
    if client.email.is_some() {
        keys.push("email");
    }
    if client.password.is_some() {
        keys.push("password");
    }
    if client.method.is_some() {
        keys.push("method");
    }
    keys
}

fn validate_clients<R: Rng>(
    c: &mut Collector,
    spec: &InboundSpec,
    policy: &ValidationPolicy,
    rng: &mut R,
) -> Option<ClientSet> {
    let allowed = match spec.protocol {
        ProtocolKind::Vless => VLESS_KEYS,
        ProtocolKind::Vmess => VMESS_KEYS,
        ProtocolKind::Trojan => TROJAN_KEYS,
        ProtocolKind::Shadowsocks => SHADOWSOCKS_KEYS,
    };
    for (i, client) in spec.clients.iter().enumerate() {
        for key in supplied_keys(client) {
            if !allowed.contains(&key) {
                c.push(ValidationError::new(
                    format!("clients[{}].{}", i, key),
                    format!("is not used by {}", spec.protocol),
                ));
            }
        }
    }

    // One generated client stands in for an empty list.
    let defaults = [ClientParams::default()];
    let clients: &[ClientParams] = if spec.clients.is_empty() && spec.protocol != ProtocolKind::Shadowsocks {
        &defaults
    } else {
        &spec.clients
    };

    let before = c.errors.len();
    let mut emails = HashSet::new();
    let mut email_of = |c: &mut Collector, i: usize, raw: &Option<String>| -> Option<String> {
        let value = c.take(fields::email(&format!("clients[{}].email", i), raw.as_deref()?))?;
        if !emails.insert(value.clone()) {
            c.push(
                ValidationError::new(format!("clients[{}].email", i), "duplicates another client's email")
                    .with_value(&value),
            );
        }
        Some(value)
    };

    let set = match spec.protocol {
        ProtocolKind::Vless => {
            let mut out = Vec::new();
            for (i, p) in clients.iter().enumerate() {
                let id = match p.id.as_deref() {
                    Some(raw) => c.take(fields::client_id(&format!("clients[{}].id", i), raw)),
                    None => Some(keys::generate_uuid(rng)),
                };
                let flow = c.take(fields::flow(
                    &format!("clients[{}].flow", i),
                    p.flow.as_deref(),
                    spec.transport,
                    spec.security,
                ));
                let email = email_of(&mut *c, i, &p.email);
                if let (Some(id), Some(flow)) = (id, flow) {
                    out.push(VlessClient { id, flow, email });
                }
            }
            check_unique(c, out.iter().map(|v| v.id.as_str()), "id");
            ClientSet::Vless(out)
        }
        ProtocolKind::Vmess => {
            let mut out = Vec::new();
            for (i, p) in clients.iter().enumerate() {
                let id = match p.id.as_deref() {
                    Some(raw) => c.take(fields::client_id(&format!("clients[{}].id", i), raw)),
                    None => Some(keys::generate_uuid(rng)),
                };
                let email = email_of(&mut *c, i, &p.email);
                if let Some(id) = id {
                    out.push(VmessClient {
                        id,
                        alter_id: p.alter_id.unwrap_or(0),
                        email,
                    });
                }
            }
            check_unique(c, out.iter().map(|v| v.id.as_str()), "id");
            ClientSet::Vmess(out)
        }
        ProtocolKind::Trojan => {
            let mut out = Vec::new();
            for (i, p) in clients.iter().enumerate() {
                let password = match p.password.as_deref() {
                    Some(raw) => c.take(fields::secret(
                        &format!("clients[{}].password", i),
                        raw,
                        policy.min_secret_len,
                    )),
                    None => Some(keys::generate_password(
                        rng,
                        keys::GENERATED_PASSWORD_LEN.max(policy.min_secret_len),
                    )),
                };
                let email = email_of(&mut *c, i, &p.email);
                if let Some(password) = password {
                    out.push(TrojanClient { password, email });
                }
            }
            check_unique(c, out.iter().map(|v| v.password.as_str()), "password");
            ClientSet::Trojan(out)
        }
        ProtocolKind::Shadowsocks => {
            let mut methods = Vec::new();
            for (i, p) in clients.iter().enumerate() {
                if let Some(raw) = p.method.as_deref().filter(|m| !m.trim().is_empty()) {
                    if let Some(m) = c.take(fields::shadowsocks_method(&format!("clients[{}].method", i), raw)) {
                        methods.push(m);
                    }
                }
            }
            let method = *methods.first()?;
            if methods.iter().any(|m| *m != method) {
                c.push(ValidationError::new(
                    "clients[].method",
                    "all clients of one inbound must share a method",
                ));
                return None;
            }

            if !method.supports_multi_user() && clients.len() > 1 {
                c.push(
                    ValidationError::new("clients", format!("{} takes a single client", method))
                        .with_value(format!("{} clients", clients.len())),
                );
                return None;
            }

            let mut out = Vec::new();
            for (i, p) in clients.iter().enumerate() {
                let field = format!("clients[{}].password", i);
                let password = match (p.password.as_deref(), method.psk_len()) {
                    (Some(raw), Some(_)) => c.take(fields::ss2022_key(&field, raw, method)),
                    (Some(raw), None) => c.take(fields::secret(&field, raw, policy.min_secret_len)),
                    (None, Some(len)) => Some(keys::generate_psk(rng, len)),
                    (None, None) => Some(keys::generate_password(
                        rng,
                        keys::GENERATED_PASSWORD_LEN.max(policy.min_secret_len),
                    )),
                };
                let email = email_of(&mut *c, i, &p.email);
                if let Some(password) = password {
                    out.push(ShadowsocksClient {
                        method: (!method.is_2022()).then(|| method.as_str().to_string()),
                        password,
                        email,
                    });
                }
            }
            check_unique(c, out.iter().map(|v| v.password.as_str()), "password");
            let server_psk = method
                .psk_len()
                .filter(|_| method.supports_multi_user())
                .map(|len| keys::generate_psk(rng, len));
            ClientSet::Shadowsocks {
                method,
                server_psk,
                clients: out,
            }
        }
    };

    (c.errors.len() == before).then_some(set)
}

fn not_blank(value: &str) -> Option<&str> {
    Some(value).filter(|v| !v.trim().is_empty())
}

fn check_unique<'a>(c: &mut Collector, values: impl Iterator<Item = &'a str>, key: &str) {
    let mut seen = HashSet::new();
    for (i, v) in values.enumerate() {
        if !seen.insert(v) {
            // Passwords are not echoed back.
            let e = ValidationError::new(
                format!("clients[{}].{}", i, key),
                format!("duplicates another client's {}", key),
            );
            c.push(if key == "id" { e.with_value(v) } else { e });
        }
    }
}

fn validate_transport(c: &mut Collector, spec: &InboundSpec) -> ValidatedTransport {
    let Some(opts) = &spec.transport_opts else {
        return ValidatedTransport::default();
    };
    let non_empty = |v: &Option<String>| v.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(str::to_string);

    ValidatedTransport {
        path: non_empty(&opts.path).and_then(|p| c.take(fields::path("transport_opts.path", &p))),
        host: non_empty(&opts.host).and_then(|h| c.take(fields::domain("transport_opts.host", &h))),
        service_name: non_empty(&opts.service_name)
            .and_then(|s| c.take(fields::service_name("transport_opts.service_name", &s))),
    }
}

fn validate_tls(c: &mut Collector, tls: &TlsParams) -> Option<ValidatedTls> {
    let server_name = not_blank(&tls.server_name).and_then(|v| c.take(fields::domain("tls.server_name", v)));

    let cert = tls.certificate_file.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let key = tls.key_file.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let certificate = match (cert, key) {
        (Some(cert), Some(key)) => {
            let cert = c.take(fields::file_path("tls.certificate_file", cert));
            let key = c.take(fields::file_path("tls.key_file", key));
            cert.zip(key)
        }
        (None, None) => None,
        (Some(_), None) => {
            c.push(ValidationError::new("tls.key_file", "must be set together with certificate_file"));
            None
        }
        (None, Some(_)) => {
            c.push(ValidationError::new("tls.certificate_file", "must be set together with key_file"));
            None
        }
    };

    let mut alpn = Vec::new();
    for (i, raw) in tls.alpn.iter().enumerate() {
        if let Some(v) = c.take(fields::alpn(&format!("tls.alpn[{}]", i), raw)) {
            if !alpn.contains(&v) {
                alpn.push(v);
            }
        }
    }

    Some(ValidatedTls {
        server_name: server_name?,
        certificate,
        alpn,
    })
}

fn validate_reality<R: Rng>(c: &mut Collector, reality: &RealityParams, rng: &mut R) -> Option<ValidatedReality> {
    let dest = not_blank(&reality.dest).and_then(|v| c.take(fields::reality_dest("reality.dest", v)));

    let mut server_names = Vec::new();
    for (i, raw) in reality.server_names.iter().enumerate() {
        if let Some(name) = c.take(fields::domain(&format!("reality.server_names[{}]", i), raw)) {
            if !server_names.contains(&name) {
                server_names.push(name);
            }
        }
    }

    let private = reality.private_key.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let public = reality.public_key.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let keypair = match (private, public) {
        (Some(private), public) => {
            let derived = c
                .take(fields::x25519_key("reality.private_key", private))
                .map(keys::reality_keypair_from_private);
            match (derived, public) {
                (Some(pair), Some(public)) => {
                    let matches = keys::decode_key(public).is_some_and(|p| keys::encode_key(&p) == pair.public_key);
                    if matches {
                        Some(pair)
                    } else {
                        c.push(ValidationError::new(
                            "reality.public_key",
                            "does not belong to the supplied private key",
                        ));
                        None
                    }
                }
                (derived, _) => derived,
            }
        }
        (None, Some(_)) => {
            c.push(ValidationError::new(
                "reality.public_key",
                "cannot be used without its private key",
            ));
            None
        }
        (None, None) => Some(keys::generate_reality_keypair(rng)),
    };

    let mut short_ids = Vec::new();
    for (i, raw) in reality.short_ids.iter().enumerate() {
        if let Some(sid) = c.take(fields::short_id(&format!("reality.short_ids[{}]", i), raw)) {
            if !short_ids.contains(&sid) {
                short_ids.push(sid);
            }
        }
    }
    if reality.short_ids.is_empty() {
        short_ids.push(keys::generate_short_id(rng));
    }

    let fingerprint = c.take(fields::fingerprint("reality.fingerprint", reality.fingerprint.as_deref()));

    let xver = reality.xver.unwrap_or(0);
    if xver > 2 {
        c.push(ValidationError::new("reality.xver", "must be 0, 1 or 2").with_value(xver));
    }

    let (dest, dest_host) = dest?;
    Some(ValidatedReality {
        dest,
        dest_host,
        server_names,
        keypair: keypair?,
        short_ids,
        fingerprint: fingerprint?,
        xver,
    })
}

fn validate_fallbacks(c: &mut Collector, spec: &InboundSpec, own_port: u16) -> Vec<Fallback> {
    let mut out = Vec::new();
    let mut routes = HashSet::new();
    for (i, f) in spec.fallbacks.iter().enumerate() {
        let dest = c.take(fields::fallback_dest(&format!("fallbacks[{}].dest", i), &f.dest, own_port));
        let path = match f.path.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(p) => c.take(fields::path(&format!("fallbacks[{}].path", i), p)),
            None => None,
        };
        let alpn = match f.alpn.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(a) => c.take(fields::alpn(&format!("fallbacks[{}].alpn", i), a)),
            None => None,
        };
        let xver = f.xver.unwrap_or(0);
        if xver > 2 {
            c.push(ValidationError::new(format!("fallbacks[{}].xver", i), "must be 0, 1 or 2").with_value(xver));
            continue;
        }
        // Xray picks a fallback by (alpn, path); two entries with the same
        // pair would shadow each other.
        if !routes.insert((alpn.clone(), path.clone())) {
            c.push(ValidationError::new(
                format!("fallbacks[{}]", i),
                "duplicates the alpn/path match of an earlier fallback",
            ));
            continue;
        }
        if let Some(dest) = dest {
            out.push(Fallback { alpn, path, dest, xver });
        }
    }
    out
}

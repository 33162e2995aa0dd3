use crate::config::{FallbackDest, InboundConfig, SecuritySettings, TransportSettings};
use crate::error::{CollisionKind, SynthError};
use crate::keys;
use crate::model::*;
use crate::validate::{ValidationPolicy, validate_spec};
use crate::{InboundSet, Synthesizer, build, presets};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::json;

const SNI: &str = "www.example.com";

fn seeded() -> StdRng {
    StdRng::seed_from_u64(0xca7a)
}

fn synth(specs: &[InboundSpec]) -> Result<InboundSet, crate::ErrorList> {
    Synthesizer::default().synthesize_with(specs, &mut seeded())
}

fn vless_reality_tcp(port: i64, tag: &str) -> InboundSpec {
    InboundSpec::new(ProtocolKind::Vless, TransportKind::Tcp, SecurityKind::Reality, port, tag)
        .with_reality(RealityParams::new(SNI).with_short_id("0123456789abcdef"))
}

fn field_names(err: &crate::ErrorList) -> Vec<&str> {
    err.field_errors().map(|e| e.field.as_str()).collect()
}

#[test]
fn vless_reality_on_443_generates_one_client() {
    let set = synth(&[vless_reality_tcp(443, "vless-443")]).unwrap();
    assert_eq!(set.len(), 1);

    let inbound = &set.inbounds()[0];
    assert_eq!(inbound.port, 443);
    assert_eq!(inbound.listen, "0.0.0.0");
    assert_eq!(inbound.protocol(), ProtocolKind::Vless);
    assert_eq!(inbound.network(), TransportKind::Tcp);

    let reality = inbound.reality().expect("reality settings");
    assert_eq!(reality.dest, SNI);
    assert_eq!(reality.server_names, vec![SNI]);
    assert_eq!(reality.short_ids, vec!["0123456789abcdef"]);
    assert_eq!(reality.fingerprint, "chrome");

    let json = inbound.to_json().unwrap();
    let clients = json["settings"]["clients"].as_array().unwrap();
    assert_eq!(clients.len(), 1);
    let id = uuid::Uuid::parse_str(clients[0]["id"].as_str().unwrap()).unwrap();
    assert_eq!(id.get_version_num(), 4);
    assert_eq!(clients[0]["flow"], "xtls-rprx-vision");
    assert_eq!(json["settings"]["decryption"], "none");
}

#[test]
fn output_uses_xray_field_names() {
    let set = synth(&[vless_reality_tcp(443, "in")]).unwrap();
    let json = set.inbounds()[0].to_json().unwrap();

    assert_eq!(json["protocol"], "vless");
    assert_eq!(json["streamSettings"]["network"], "tcp");
    assert_eq!(json["streamSettings"]["security"], "reality");
    assert_eq!(json["streamSettings"]["realitySettings"]["show"], false);
    assert_eq!(json["streamSettings"]["realitySettings"]["xver"], 0);
    assert!(json["streamSettings"]["realitySettings"]["privateKey"].is_string());
    assert_eq!(json["sniffing"], json!({ "enabled": true, "destOverride": ["http", "tls"] }));
    assert!(json["streamSettings"].get("tlsSettings").is_none());
}

#[test]
fn generated_public_key_matches_private_key() {
    let set = synth(&[vless_reality_tcp(443, "in")]).unwrap();
    let reality = set.inbounds()[0].reality().unwrap();
    let raw = keys::decode_key(&reality.private_key).unwrap();
    let pair = keys::reality_keypair_from_private(raw);
    assert_eq!(reality.public_key.as_deref(), Some(pair.public_key.as_str()));
}

#[test]
fn build_is_deterministic() {
    let policy = ValidationPolicy::default();
    let spec = vless_reality_tcp(443, "in");
    let validated = validate_spec(&spec, 0, &policy, &mut seeded()).unwrap();
    assert_eq!(build(&validated), build(&validated));
}

#[test]
fn same_seed_same_set() {
    let specs = crate::presets::standard_set(20000, SNI);
    let a = synth(&specs).unwrap();
    let b = synth(&specs).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.len(), 7);
}

#[test]
fn config_survives_json_round_trip() {
    let specs = crate::presets::standard_set(20000, SNI);
    for inbound in synth(&specs).unwrap().inbounds() {
        let text = serde_json::to_string(inbound).unwrap();
        let parsed: InboundConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(&parsed, inbound, "{}", inbound.tag);
    }
}

#[test]
fn shadowsocks_with_reality_is_unsupported() {
    let spec = InboundSpec::new(
        ProtocolKind::Shadowsocks,
        TransportKind::Tcp,
        SecurityKind::Reality,
        8388,
        "ss",
    )
    .with_reality(RealityParams::new(SNI));

    let err = synth(&[spec]).unwrap_err();
    assert!(err.has_unsupported());
    assert!(err.collisions().next().is_none());
    match err.iter().next().unwrap() {
        SynthError::UnsupportedCombination { index, tag, combination } => {
            assert_eq!(*index, 0);
            assert_eq!(tag, "ss");
            assert_eq!(combination.protocol, ProtocolKind::Shadowsocks);
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn websocket_cannot_carry_reality() {
    let spec = InboundSpec::new(ProtocolKind::Vless, TransportKind::Ws, SecurityKind::Reality, 443, "ws")
        .with_reality(RealityParams::new(SNI));
    assert!(synth(&[spec]).unwrap_err().has_unsupported());
}

#[test]
fn port_8443_twice_names_both_tags() {
    let err = synth(&[vless_reality_tcp(8443, "first"), vless_reality_tcp(8443, "second")]).unwrap_err();
    assert_eq!(err.len(), 1);

    let collision = err.collisions().next().unwrap();
    assert_eq!(collision.kind, CollisionKind::Port);
    assert_eq!(collision.value, "8443");
    assert!(collision.involves("first"));
    assert!(collision.involves("second"));
    assert_eq!(
        collision.to_string(),
        "port 8443 is claimed by inbounds[0] (first), inbounds[1] (second)"
    );
}

#[test]
fn one_bad_spec_blocks_the_whole_set() {
    let good = vless_reality_tcp(443, "good");
    let bad = vless_reality_tcp(70000, "bad");
    let err = synth(&[good, bad]).unwrap_err();
    assert_eq!(field_names(&err), vec!["inbounds[1].port"]);
}

#[test]
fn rejection_counts_errors_not_specs() {
    let specs = [
        vless_reality_tcp(443, "one"),
        vless_reality_tcp(70000, "bad tag!"),
        vless_reality_tcp(444, "three"),
    ];
    let err = synth(&specs).unwrap_err();
    assert_eq!(err.len(), 2);
    assert_eq!(err.to_string(), "inbound synthesis failed with 2 error(s)");
}

#[test]
fn every_field_error_is_collected() {
    let spec = InboundSpec::new(ProtocolKind::Vless, TransportKind::Tcp, SecurityKind::Reality, 0, "bad tag!")
        .with_client(ClientParams::with_id("this id is far too long to be a custom id"))
        .with_reality(RealityParams {
            dest: "www.example.com:99999".to_string(),
            short_ids: vec!["xyz".to_string()],
            fingerprint: Some("netscape".to_string()),
            ..Default::default()
        });

    let err = synth(&[spec]).unwrap_err();
    assert_eq!(
        field_names(&err),
        vec![
            "inbounds[0].port",
            "inbounds[0].tag",
            "inbounds[0].clients[0].id",
            "inbounds[0].reality.dest",
            "inbounds[0].reality.short_ids[0]",
            "inbounds[0].reality.fingerprint",
        ]
    );
}

#[test]
fn reserved_ports_come_from_policy() {
    let policy = ValidationPolicy {
        reserved_ports: [8080].into_iter().collect(),
        min_secret_len: 8,
    };
    let spec = InboundSpec::new(ProtocolKind::Vmess, TransportKind::Tcp, SecurityKind::None, 8080, "vmess");
    let err = Synthesizer::new(policy).synthesize_with(&[spec.clone()], &mut seeded()).unwrap_err();
    assert_eq!(err.field_errors().next().unwrap().reason, "port is reserved on this host");

    assert!(synth(&[spec]).is_ok());
}

#[test]
fn missing_reality_block_is_reported_as_required_field() {
    let spec = InboundSpec::new(ProtocolKind::Trojan, TransportKind::Tcp, SecurityKind::Reality, 443, "trojan");
    let err = synth(&[spec]).unwrap_err();
    assert_eq!(field_names(&err), vec!["inbounds[0].reality.dest"]);
    assert!(err.to_string().contains("1 error"));
}

#[test]
fn blocks_for_other_securities_are_refused() {
    let spec = vless_reality_tcp(443, "in").with_tls(TlsParams::for_domain(SNI));
    let err = synth(&[spec]).unwrap_err();
    assert_eq!(field_names(&err), vec!["inbounds[0].tls"]);
}

#[test]
fn client_keys_must_fit_the_protocol() {
    let spec = InboundSpec::new(ProtocolKind::Vmess, TransportKind::Ws, SecurityKind::None, 8080, "vmess")
        .with_client(ClientParams {
            flow: Some("xtls-rprx-vision".to_string()),
            password: Some("hunter22".to_string()),
            ..Default::default()
        });
    let err = synth(&[spec]).unwrap_err();
    assert_eq!(
        field_names(&err),
        vec!["inbounds[0].clients[0].flow", "inbounds[0].clients[0].password"]
    );
}

#[test]
fn vision_flow_is_refused_off_tcp() {
    let spec = InboundSpec::new(ProtocolKind::Vless, TransportKind::Grpc, SecurityKind::Reality, 443, "grpc")
        .with_reality(RealityParams::new(SNI))
        .with_client(ClientParams {
            flow: Some("xtls-rprx-vision".to_string()),
            ..Default::default()
        });
    let err = synth(&[spec]).unwrap_err();
    assert_eq!(field_names(&err), vec!["inbounds[0].clients[0].flow"]);
}

#[test]
fn grpc_reality_has_no_default_flow() {
    let spec = InboundSpec::new(ProtocolKind::Vless, TransportKind::Grpc, SecurityKind::Reality, 443, "grpc")
        .with_reality(RealityParams::new(SNI));
    let set = synth(&[spec]).unwrap();
    let json = set.inbounds()[0].to_json().unwrap();
    assert!(json["settings"]["clients"][0].get("flow").is_none());
    assert_eq!(
        json["streamSettings"]["grpcSettings"],
        json!({ "serviceName": "grpc", "multiMode": false })
    );
}

#[test]
fn custom_ids_map_to_uuid_v5() {
    let spec = vless_reality_tcp(443, "in").with_client(ClientParams::with_id("alice"));
    let set = synth(&[spec]).unwrap();
    let json = set.inbounds()[0].to_json().unwrap();
    let expected = uuid::Uuid::new_v5(&uuid::Uuid::nil(), b"alice").to_string();
    assert_eq!(json["settings"]["clients"][0]["id"], expected);
}

#[test]
fn duplicate_client_ids_are_rejected() {
    let id = "b831381d-6324-4d53-ad4f-8cda48b30811";
    let spec = vless_reality_tcp(443, "in")
        .with_client(ClientParams::with_id(id))
        .with_client(ClientParams::with_id(id.to_uppercase()));
    let err = synth(&[spec]).unwrap_err();
    let e = err.field_errors().next().unwrap();
    assert_eq!(e.field, "inbounds[0].clients[1].id");
    assert_eq!(e.offending_value.as_deref(), Some(id));
}

#[test]
fn mismatched_reality_public_key_is_rejected() {
    let pair = keys::generate_reality_keypair(&mut seeded());
    let other = keys::generate_reality_keypair(&mut StdRng::seed_from_u64(99));

    let mut reality = RealityParams::new(SNI);
    reality.private_key = Some(pair.private_key.clone());
    reality.public_key = Some(other.public_key);
    let spec = InboundSpec::new(ProtocolKind::Vless, TransportKind::Tcp, SecurityKind::Reality, 443, "in")
        .with_reality(reality.clone());
    let err = synth(&[spec]).unwrap_err();
    assert_eq!(field_names(&err), vec!["inbounds[0].reality.public_key"]);

    reality.public_key = Some(pair.public_key.clone());
    let spec = InboundSpec::new(ProtocolKind::Vless, TransportKind::Tcp, SecurityKind::Reality, 443, "in")
        .with_reality(reality);
    let set = synth(&[spec]).unwrap();
    assert_eq!(set.inbounds()[0].reality().unwrap().private_key, pair.private_key);
}

#[test]
fn tls_certificate_defaults_to_letsencrypt_layout() {
    let spec = InboundSpec::new(ProtocolKind::Trojan, TransportKind::Ws, SecurityKind::Tls, 443, "trojan-ws")
        .with_tls(TlsParams::for_domain("Proxy.Example.org."))
        .with_client(ClientParams::with_password("correct horse battery"));
    let set = synth(&[spec]).unwrap();
    let json = set.inbounds()[0].to_json().unwrap();

    assert_eq!(
        json["streamSettings"]["tlsSettings"],
        json!({
            "serverName": "proxy.example.org",
            "certificates": [{
                "certificateFile": "/etc/letsencrypt/live/proxy.example.org/fullchain.pem",
                "keyFile": "/etc/letsencrypt/live/proxy.example.org/privkey.pem"
            }],
            "alpn": ["h2", "http/1.1"]
        })
    );
    assert_eq!(json["streamSettings"]["wsSettings"], json!({ "path": "/" }));
    assert_eq!(json["settings"]["clients"][0]["password"], "correct horse battery");
}

#[test]
fn half_a_certificate_pair_is_rejected() {
    let mut tls = TlsParams::for_domain("proxy.example.org");
    tls.certificate_file = Some("/srv/cert.pem".to_string());
    let spec = InboundSpec::new(ProtocolKind::Vmess, TransportKind::Tcp, SecurityKind::Tls, 443, "vmess").with_tls(tls);
    let err = synth(&[spec]).unwrap_err();
    assert_eq!(field_names(&err), vec!["inbounds[0].tls.key_file"]);
}

#[test]
fn short_trojan_password_is_not_echoed() {
    let spec = InboundSpec::new(ProtocolKind::Trojan, TransportKind::Tcp, SecurityKind::Tls, 443, "trojan")
        .with_tls(TlsParams::for_domain("proxy.example.org"))
        .with_client(ClientParams::with_password("abc"));
    let err = synth(&[spec]).unwrap_err();
    let e = err.field_errors().next().unwrap();
    assert_eq!(e.offending_value.as_deref(), Some("3 characters"));
}

#[test]
fn shadowsocks_2022_gets_server_and_user_keys() {
    let spec = InboundSpec::new(
        ProtocolKind::Shadowsocks,
        TransportKind::Tcp,
        SecurityKind::None,
        8388,
        "ss",
    )
    .with_client(ClientParams::shadowsocks("2022-blake3-aes-256-gcm", None));

    let set = synth(&[spec]).unwrap();
    let json = set.inbounds()[0].to_json().unwrap();
    let settings = &json["settings"];
    assert_eq!(settings["method"], "2022-blake3-aes-256-gcm");
    assert_eq!(settings["network"], "tcp,udp");

    let server = keys::decode_psk(settings["password"].as_str().unwrap()).unwrap();
    let user = keys::decode_psk(settings["clients"][0]["password"].as_str().unwrap()).unwrap();
    assert_eq!(server.len(), 32);
    assert_eq!(user.len(), 32);
}

#[test]
fn shadowsocks_needs_a_method_and_one_method_only() {
    let bare = InboundSpec::new(ProtocolKind::Shadowsocks, TransportKind::Tcp, SecurityKind::None, 8388, "ss");
    let err = synth(&[bare]).unwrap_err();
    assert_eq!(field_names(&err), vec!["inbounds[0].clients[].method"]);

    let mixed = InboundSpec::new(ProtocolKind::Shadowsocks, TransportKind::Tcp, SecurityKind::None, 8388, "ss")
        .with_client(ClientParams::shadowsocks("aes-128-gcm", Some("password-one".to_string())))
        .with_client(ClientParams::shadowsocks("aes-256-gcm", Some("password-two".to_string())));
    let err = synth(&[mixed]).unwrap_err();
    assert_eq!(field_names(&err), vec!["inbounds[0].clients[].method"]);
}

#[test]
fn shadowsocks_2022_clients_inherit_the_server_method() {
    let spec = presets::Preset::ShadowsocksTcp.spec(8388, SNI);
    let set = synth(&[spec]).unwrap();
    let json = set.inbounds()[0].to_json().unwrap();
    assert!(json["settings"]["method"].as_str().unwrap().starts_with("2022-"));
    assert!(json["settings"]["password"].is_string());
    assert!(json["settings"]["clients"][0].get("method").is_none());
}

#[test]
fn chacha20_2022_is_a_single_user_inbound() {
    let spec = InboundSpec::new(ProtocolKind::Shadowsocks, TransportKind::Tcp, SecurityKind::None, 8388, "ss")
        .with_client(ClientParams::shadowsocks("2022-blake3-chacha20-poly1305", None));
    let set = synth(&[spec]).unwrap();
    let json = set.inbounds()[0].to_json().unwrap();
    let settings = &json["settings"];
    assert_eq!(settings["method"], "2022-blake3-chacha20-poly1305");
    assert_eq!(keys::decode_psk(settings["password"].as_str().unwrap()).unwrap().len(), 32);
    assert!(settings.get("clients").is_none());

    let two = InboundSpec::new(ProtocolKind::Shadowsocks, TransportKind::Tcp, SecurityKind::None, 8388, "ss")
        .with_client(ClientParams::shadowsocks("2022-blake3-chacha20-poly1305", None))
        .with_client(ClientParams::shadowsocks("2022-blake3-chacha20-poly1305", None));
    let err = synth(&[two]).unwrap_err();
    assert_eq!(field_names(&err), vec!["inbounds[0].clients"]);
}

#[test]
fn classic_shadowsocks_has_no_server_psk() {
    let spec = InboundSpec::new(ProtocolKind::Shadowsocks, TransportKind::Tcp, SecurityKind::None, 8388, "ss")
        .with_client(ClientParams::shadowsocks("chacha20-poly1305", Some("long enough secret".to_string())));
    let set = synth(&[spec]).unwrap();
    let json = set.inbounds()[0].to_json().unwrap();
    assert_eq!(json["settings"]["method"], "chacha20-ietf-poly1305");
    assert!(json["settings"].get("password").is_none());
    assert_eq!(json["settings"]["clients"][0]["password"], "long enough secret");
    assert_eq!(json["settings"]["clients"][0]["method"], "chacha20-ietf-poly1305");
}

#[test]
fn fallbacks_pass_through_on_tcp() {
    let spec = InboundSpec::new(ProtocolKind::Trojan, TransportKind::Tcp, SecurityKind::Tls, 443, "trojan")
        .with_tls(TlsParams::for_domain("proxy.example.org"))
        .with_fallback(FallbackParams {
            dest: "8080".to_string(),
            ..Default::default()
        })
        .with_fallback(FallbackParams {
            dest: "/dev/shm/ws.sock".to_string(),
            path: Some("/ws".to_string()),
            xver: Some(1),
            ..Default::default()
        });

    let set = synth(&[spec]).unwrap();
    let fallbacks = set.inbounds()[0].settings.fallbacks();
    assert_eq!(fallbacks.len(), 2);
    assert_eq!(fallbacks[0].dest, FallbackDest::Port(8080));
    assert_eq!(fallbacks[1].path.as_deref(), Some("/ws"));

    let json = set.inbounds()[0].to_json().unwrap();
    assert_eq!(
        json["settings"]["fallbacks"],
        json!([
            { "dest": 8080, "xver": 0 },
            { "path": "/ws", "dest": "/dev/shm/ws.sock", "xver": 1 }
        ])
    );
}

#[test]
fn fallback_loops_and_duplicates_are_rejected() {
    let spec = vless_reality_tcp(443, "in")
        .with_fallback(FallbackParams {
            dest: "127.0.0.1:443".to_string(),
            ..Default::default()
        })
        .with_fallback(FallbackParams {
            dest: "8001".to_string(),
            path: Some("/a".to_string()),
            ..Default::default()
        })
        .with_fallback(FallbackParams {
            dest: "8002".to_string(),
            path: Some("/a".to_string()),
            ..Default::default()
        });
    let err = synth(&[spec]).unwrap_err();
    assert_eq!(
        field_names(&err),
        vec!["inbounds[0].fallbacks[0].dest", "inbounds[0].fallbacks[2]"]
    );
}

#[test]
fn fallbacks_are_refused_off_tcp() {
    let spec = InboundSpec::new(ProtocolKind::Vless, TransportKind::Ws, SecurityKind::Tls, 443, "ws")
        .with_tls(TlsParams::for_domain("proxy.example.org"))
        .with_fallback(FallbackParams {
            dest: "8080".to_string(),
            ..Default::default()
        });
    let err = synth(&[spec]).unwrap_err();
    assert_eq!(field_names(&err), vec!["inbounds[0].fallbacks"]);
}

#[test]
fn fallbacks_need_tls_or_reality() {
    let spec = InboundSpec::new(ProtocolKind::Vless, TransportKind::Tcp, SecurityKind::None, 8080, "plain")
        .with_fallback(FallbackParams {
            dest: "8081".to_string(),
            ..Default::default()
        });
    let err = synth(&[spec]).unwrap_err();
    assert_eq!(field_names(&err), vec!["inbounds[0].fallbacks"]);
}

#[test]
fn blank_required_fields_are_reported_once() {
    let err = synth(&[vless_reality_tcp(443, "")]).unwrap_err();
    assert_eq!(field_names(&err), vec!["inbounds[0].tag"]);

    let reality = InboundSpec::new(ProtocolKind::Vless, TransportKind::Tcp, SecurityKind::Reality, 443, "r")
        .with_reality(RealityParams::new(""));
    let err = synth(&[reality]).unwrap_err();
    assert_eq!(field_names(&err), vec!["inbounds[0].reality.dest"]);

    let tls = InboundSpec::new(ProtocolKind::Trojan, TransportKind::Tcp, SecurityKind::Tls, 443, "t")
        .with_tls(TlsParams::for_domain(" "));
    let err = synth(&[tls]).unwrap_err();
    assert_eq!(field_names(&err), vec!["inbounds[0].tls.server_name"]);

    let ss = InboundSpec::new(ProtocolKind::Shadowsocks, TransportKind::Tcp, SecurityKind::None, 8388, "ss")
        .with_client(ClientParams::shadowsocks("", Some("long enough secret".to_string())));
    let err = synth(&[ss]).unwrap_err();
    assert_eq!(field_names(&err), vec!["inbounds[0].clients[].method"]);
}

#[test]
fn sniffing_override_is_honoured() {
    let mut spec = InboundSpec::new(ProtocolKind::Vmess, TransportKind::Tcp, SecurityKind::None, 8080, "vmess");
    spec.sniffing = Some(SniffingParams {
        enabled: true,
        dest_override: vec![SniffTarget::Quic],
    });
    let set = synth(&[spec.clone()]).unwrap();
    assert_eq!(
        set.inbounds()[0].to_json().unwrap()["sniffing"],
        json!({ "enabled": true, "destOverride": ["quic"] })
    );

    spec.sniffing = Some(SniffingParams {
        enabled: true,
        dest_override: vec![],
    });
    let err = synth(&[spec]).unwrap_err();
    assert_eq!(field_names(&err), vec!["inbounds[0].sniffing.dest_override"]);
}

#[test]
fn httpupgrade_transport_shape() {
    let spec = crate::presets::Preset::VlessRealityHttpUpgrade.spec(2083, SNI);
    let set = synth(&[spec]).unwrap();
    let inbound = &set.inbounds()[0];
    match &inbound.stream_settings.transport {
        TransportSettings::HttpUpgrade { httpupgrade_settings } => {
            assert_eq!(httpupgrade_settings.path, "/xhttp");
            assert_eq!(httpupgrade_settings.host, None);
        }
        other => panic!("unexpected transport {:?}", other),
    }
    assert!(matches!(inbound.stream_settings.security, SecuritySettings::Reality { .. }));
}

#[test]
fn xhttp_is_read_as_httpupgrade() {
    let spec: InboundSpec = serde_json::from_value(json!({
        "protocol": "vless",
        "transport": "xhttp",
        "security": "reality",
        "port": 2083,
        "tag": "xhttp",
        "reality": { "dest": "www.example.com" }
    }))
    .unwrap();
    assert_eq!(spec.transport, TransportKind::HttpUpgrade);
}

#[test]
fn errors_serialize_as_tagged_data() {
    let err = synth(&[vless_reality_tcp(8443, "a"), vless_reality_tcp(8443, "b")]).unwrap_err();
    assert_eq!(
        serde_json::to_value(&err).unwrap(),
        json!([{
            "type": "collision",
            "kind": "port",
            "value": "8443",
            "members": [{ "index": 0, "tag": "a" }, { "index": 1, "tag": "b" }]
        }])
    );
}

#[test]
fn synthesizer_is_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Synthesizer>();

    let synth = std::sync::Arc::new(Synthesizer::default());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let synth = synth.clone();
            std::thread::spawn(move || synth.synthesize(&[vless_reality_tcp(10000 + i, "t")]).is_ok())
        })
        .collect();
    for h in handles {
        assert!(h.join().unwrap());
    }
}

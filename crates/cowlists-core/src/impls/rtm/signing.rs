//! Signing - リクエストの署名
//!
//! すべての呼び出しに `api_sig` を付けます。共有シークレットの後に、
//! キー順に並べた全パラメータを `key value` で連結し、MD5 の 16 進ダイジェストを取ったものです。

use std::collections::BTreeMap;

pub const SIGNATURE_PARAM: &str = "api_sig";

/// ハッシュする連結文字列。`BTreeMap` がキーの順序を保つ
pub fn signature_base(secret: &str, params: &BTreeMap<String, String>) -> String {
    let mut base = String::from(secret);
    for (key, value) in params {
        base.push_str(key);
        base.push_str(value);
    }
    base
}

pub fn sign(secret: &str, params: &BTreeMap<String, String>) -> String {
    format!("{:x}", md5::compute(signature_base(secret, params)))
}

/// `params` に `api_sig` を加える
pub fn signed(secret: &str, mut params: BTreeMap<String, String>) -> BTreeMap<String, String> {
    let signature = sign(secret, &params);
    params.insert(SIGNATURE_PARAM.to_string(), signature);
    params
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn parameters_are_sorted_before_hashing() {
        let p = params(&[("yxz", "foo"), ("feg", "bar"), ("abc", "baz")]);
        assert_eq!(signature_base("BANANAS", &p), "BANANASabcbazfegbaryxzfoo");
    }

    #[test]
    fn documented_signature() {
        let p = params(&[("yxz", "foo"), ("feg", "bar"), ("abc", "baz")]);
        assert_eq!(sign("BANANAS", &p), "82044aae4dd676094f23f1ec152159ba");
    }

    #[test]
    fn signed_adds_api_sig_without_hashing_it() {
        let p = params(&[("method", "rtm.test.echo")]);
        let expected = sign("secret", &p);

        let out = signed("secret", p);

        assert_eq!(out.get(SIGNATURE_PARAM), Some(&expected));
        assert_eq!(out.len(), 2);
    }
}

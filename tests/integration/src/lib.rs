//! Key material shared by the scenario tests.
//!
//! Real self-signed certificates generated with openssl, base64 DER as it
//! appears inside `<ds:X509Certificate>`.

#![forbid(unsafe_code)]

/// RSA 2048 certificate, CN=idp.example.org.
pub const IDP_SIGNING_CERT: &str = "MIIDFzCCAf+gAwIBAgIUBM9NiBbrmZ8t3UGY8x0xvCq5wL8wDQYJKoZIhvcNAQELBQAwGjEYMBYGA1UEAwwPaWRwLmV4YW1wbGUub3JnMCAXDTI2MTAxNzIyNTgyMFoYDzIxMjYwOTIzMjI1ODIwWjAaMRgwFgYDVQQDDA9pZHAuZXhhbXBsZS5vcmcwggEiMA0GCSqGSIb3DQEBAQUAA4IBDwAwggEKAoIBAQDI7/wAXKGRuPxz9e/NKo32B1lwoKBuAOPyltO4dlI8PSqogaR+GhtNjjZhTZRtyAN45CGrorqh5tbxhhI24cubu9kkdPq79ckeE0LnXa+C7thIGorUA84Y4utOr8gwkj3ETRLzjSMLWSEASz4fQR/Y8IQXC1uPk04sw3GMAN7JrSp5lezh8ZyD8zDNQZVEfQl8amULliR/5bAmNu9zNoJ2G0PkWSS3oBpVOvHYnHwtRpbfuF8KQT5uVC99/YuFPGlrOdkaVXbumoQ6OL+VGty4A447Vul/Tr2abGokuXrzVJio8neK6CW4MrIxlJ4CIF8jWbjopG7AP85BsmKKC91BAgMBAAGjUzBRMB0GA1UdDgQWBBQrp0jVJIA4+I70BBLQL/czX9IbvTAfBgNVHSMEGDAWgBQrp0jVJIA4+I70BBLQL/czX9IbvTAPBgNVHRMBAf8EBTADAQH/MA0GCSqGSIb3DQEBCwUAA4IBAQDBw4L+v+1A3FSJlHcLrnpoGs0WTqbghTcBN3ybHMmzo1kyHgMU2M4GlJYjMurcvoMh2pwjNzUdM5nZV1Ab6AfO3mF1o94Dwhd2buao0ph/KUE0Ikk6MEyUMUayU+FcWyySrxFesmIx3clgewavab0UtIBHELALOw9o/qaoSGPuwAFTn0RNKtBTFPsVeM8uvCOSNhzvfW6fuIh1l5NoYxB1styMEas7DEC88Pr8LypDcDY9DPCcbdNimxVMfCjJBaZdF2Mxsj5FunTLGH2ATcjpFyHTquNByVFGEZ7mZHdtbcLrf4pB+ZzF/ufkHMvSVx7SRVXte/wS4ftuYB4QCov5";

/// EC P-256 certificate, CN=sp.example.org.
pub const SP_ENCRYPTION_CERT: &str = "MIIBiDCCAS+gAwIBAgIUH0QKplAve/grGjLnzr4T2UVddFMwCgYIKoZIzj0EAwIwGTEXMBUGA1UEAwwOc3AuZXhhbXBsZS5vcmcwIBcNMjYxMDE3MjI1ODIwWhgPMjEyNjA5MjMyMjU4MjBaMBkxFzAVBgNVBAMMDnNwLmV4YW1wbGUub3JnMFkwEwYHKoZIzj0CAQYIKoZIzj0DAQcDQgAE44Fd+H8OBQmzFMO9kSA5lVyZBatDfrKy1fJATRJswBDGczwCT25OYAEEnhbXpIFMBSTP77OiCIUGqZ+0koFjJaNTMFEwHQYDVR0OBBYEFF19inAhkG8qtkcCz2DMrGC+LM2rMB8GA1UdIwQYMBaAFF19inAhkG8qtkcCz2DMrGC+LM2rMA8GA1UdEwEB/wQFMAMBAf8wCgYIKoZIzj0EAwIDRwAwRAIgKqd5xEDCN96WWRamEtEVU4R7dynvyqRFuVaWWmpi2AgCID+GEa6QQjAGX9yBFcl0npe6QAITMm3XM9+PujX2uAmX";

/// SubjectPublicKeyInfo of [`SP_ENCRYPTION_CERT`].
pub const SP_ENCRYPTION_SPKI: &str = "MFkwEwYHKoZIzj0CAQYIKoZIzj0DAQcDQgAE44Fd+H8OBQmzFMO9kSA5lVyZBatDfrKy1fJATRJswBDGczwCT25OYAEEnhbXpIFMBSTP77OiCIUGqZ+0koFjJQ==";

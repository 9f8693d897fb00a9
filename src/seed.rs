//! Built-in knowledge saved by `init --seed`.

use crate::models::KnowledgeEntry;

struct SeedEntry {
    title: &'static str,
    content: &'static str,
    category: &'static str,
    tags: &'static [&'static str],
}

const SEED: &[SeedEntry] = &[
    SeedEntry {
        title: "CM3588 NAS Kit - Hardware Overview",
        content: r#"# CM3588 NAS Kit Hardware

## SoC: Rockchip RK3588
- **CPU**: 8 cores (4x Cortex-A76 @ 2.4GHz + 4x Cortex-A55 @ 1.8GHz)
- **GPU**: Mali-G610 MP4
- **NPU**: 6 TOPS (3 cores)
- **RAM**: 32GB LPDDR4X

## Storage
- 4x M.2 NVMe (PCIe 3.0 x1) for the NAS array
- eMMC module

## Network
- 2.5GbE Ethernet

## Wiki
https://wiki.friendlyelec.com/wiki/index.php/CM3588_NAS_Kit
"#,
        category: "hardware",
        tags: &["rk3588", "specs", "overview"],
    },
    SeedEntry {
        title: "Voice Pipeline - Wyoming Protocol (Working)",
        content: r#"# Voice Pipeline - Wyoming Protocol

## Current working setup

| Service      | Port  | Model              | Backend |
|--------------|-------|--------------------|---------|
| openWakeWord | 10400 | ok_nabu            | CPU     |
| Whisper STT  | 10300 | small, Russian     | CPU     |
| Piper TTS    | 10200 | ru_RU-irina-medium | CPU     |

## CPU performance
- openWakeWord: ~1% CPU
- Whisper small: ~3-5x real-time
- Piper TTS: fast enough

## Integration
Home Assistant connects over the Wyoming protocol.

## Status check
```bash
docker ps | grep -E "whisper|piper|wake"
ss -tlnp | grep -E "1020|1030|1040"
```
"#,
        category: "voice-pipeline",
        tags: &["wyoming", "whisper", "piper", "wake-word", "working"],
    },
    SeedEntry {
        title: "NPU (RKNN) - Current Status",
        content: r#"# NPU (RKNN) Status

| Parameter | Value                |
|-----------|----------------------|
| Driver    | RKNPU v0.9.8         |
| Clock     | 1 GHz                |
| TOPS      | 6 (theoretical)      |

## Check
```bash
cat /sys/kernel/debug/rknpu/version
cat /sys/kernel/debug/rknpu/load
```

## RKNN Toolkit
```bash
pip3 install rknn-toolkit-lite2
```

## Known issues
- Whisper INT8: quantization bugs (issue #314)
- Prefer sherpa-onnx or SenseVoice for STT
"#,
        category: "npu",
        tags: &["rknn", "npu", "rk3588", "driver"],
    },
    SeedEntry {
        title: "Russian STT on the RK3588 NPU - Options",
        content: r#"# Russian STT on the RK3588 NPU

| Option                      | Russian | NPU       | Speed      |
|-----------------------------|---------|-----------|------------|
| Whisper tiny.en             | no      | 30x RT    | fast       |
| SenseVoice                  | no      | 20x RT    | fast       |
| Whisper multilingual (INT8) | yes     | buggy     | -          |
| Whisper multilingual (FP32) | yes     | yes       | ~5-10x RT  |
| sherpa-onnx (Russian)       | yes     | RKNN      | ~10-15x RT |

## Best option: sherpa-onnx

https://github.com/k2-fsa/sherpa-onnx

### Russian models
- sherpa-onnx-zipformer-ru-2024-09-18
- sherpa-onnx-nemo-transducer-giga-am-v2-russian-2025-04-19
"#,
        category: "voice-pipeline",
        tags: &["russian", "stt", "sherpa-onnx", "npu"],
    },
    SeedEntry {
        title: "LLM on the RK3588 NPU - Overview",
        content: r#"# LLM on the RK3588 NPU

## Frameworks

### rknn-llm (official)
https://github.com/airockchip/rknn-llm
- Qwen, TinyLLaMA, Phi
- INT4/INT8 quantization

### llama.cpp with RKNN
- More models
- GGUF compatible

## Recommended models
- Qwen2-0.5B / Qwen2-1.5B
- TinyLLaMA 1.1B
- Phi-2 (2.7B)

## Throughput
| Model      | tokens/sec |
|------------|------------|
| Qwen2-0.5B | ~25-30     |
| TinyLLaMA  | ~15-20     |
| Qwen2-1.5B | ~10-15     |
"#,
        category: "npu",
        tags: &["llm", "rknn", "inference"],
    },
    SeedEntry {
        title: "Docker services on the CM3588",
        content: r#"# Docker services

| Container     | Purpose             |
|---------------|---------------------|
| homeassistant | Home Assistant      |
| whisper       | Wyoming Whisper STT |
| piper         | Wyoming Piper TTS   |
| openwakeword  | Wyoming Wake Word   |
| esphome       | ESPHome             |

## Check
```bash
docker ps
docker logs <container>
```

## Manage
```bash
docker restart <container>
docker-compose up -d
```
"#,
        category: "docker",
        tags: &["docker", "containers", "services"],
    },
];

/// Fresh entries (new ids and timestamps) for the built-in knowledge.
pub fn initial_knowledge() -> Vec<KnowledgeEntry> {
    SEED.iter()
        .map(|seed| {
            KnowledgeEntry::new(
                seed.title,
                seed.content,
                seed.category,
                seed.tags.iter().map(|t| t.to_string()).collect(),
            )
        })
        .collect()
}

#[cfg(test)]
mod trace_pipeline_tests {
    use std::fs;
    use std::path::Path;

    use tempfile::TempDir;

    use flowstat::analysis::{self, BatchOptions, Metric, Scheme};
    use flowstat::config::{AnalysisConfig, LinkModel};
    use flowstat::model::HOP_COUNT_UNKNOWN;
    use flowstat::trace::{self, TraceReader, DEFAULT_TRACE_TAG};
    use flowstat::TraceError;

    /// One FlowMonitor run as written by ns-3: a data flow, its ACK flow, a
    /// flow that never delivered anything, and two probes.
    fn flow_monitor(data_bytes: u64) -> String {
        format!(
            r#"<FlowMonitor>
  <FlowStats>
    <Flow flowId="1" timeFirstTxPacket="+1000000000.0ns" timeFirstRxPacket="+1000010000.0ns" timeLastTxPacket="+1001000000.0ns" timeLastRxPacket="+1001010000.0ns" delaySum="+1000000.0ns" jitterSum="+0.0ns" lastDelay="+10000.0ns" txBytes="{data_bytes}" rxBytes="{data_bytes}" txPackets="100" rxPackets="100" lostPackets="0" timesForwarded="200">
      <delayHistogram nBins="1">
        <bin index="0" start="0" width="0.001" count="100" />
      </delayHistogram>
      <flowInterruptionsHistogram nBins="0">
      </flowInterruptionsHistogram>
    </Flow>
    <Flow flowId="2" timeFirstTxPacket="+1000010000.0ns" timeFirstRxPacket="+1000020000.0ns" timeLastTxPacket="+1001010000.0ns" timeLastRxPacket="+1001020000.0ns" delaySum="+500000.0ns" jitterSum="+0.0ns" lastDelay="+10000.0ns" txBytes="2600" rxBytes="2600" txPackets="50" rxPackets="50" lostPackets="0" timesForwarded="100">
    </Flow>
    <Flow flowId="3" timeFirstTxPacket="+1000000000.0ns" timeFirstRxPacket="+0.0ns" timeLastTxPacket="+1000000000.0ns" timeLastRxPacket="+0.0ns" delaySum="+0.0ns" jitterSum="+0.0ns" lastDelay="+0.0ns" txBytes="1500" rxBytes="0" txPackets="1" rxPackets="0" lostPackets="1" timesForwarded="0">
    </Flow>
  </FlowStats>
  <Ipv4FlowClassifier>
    <Flow flowId="2" sourceAddress="10.0.1.2" destinationAddress="10.0.0.2" protocol="6" sourcePort="9" destinationPort="49153" />
    <Flow flowId="1" sourceAddress="10.0.0.2" destinationAddress="10.0.1.2" protocol="6" sourcePort="49153" destinationPort="9" />
    <Flow flowId="3" sourceAddress="10.0.0.3" destinationAddress="10.0.1.2" protocol="6" sourcePort="49154" destinationPort="9" />
  </Ipv4FlowClassifier>
  <FlowProbes>
    <FlowProbe index="1">
      <FlowStats  flowId="1" packets="100" bytes="{data_bytes}" delayFromFirstProbeSum="+500000.0ns" />
    </FlowProbe>
    <FlowProbe index="0">
      <FlowStats  flowId="1" packets="100" bytes="{data_bytes}" delayFromFirstProbeSum="+0.0ns" />
      <FlowStats  flowId="2" packets="50" bytes="2600" delayFromFirstProbeSum="+0.0ns" />
      <FlowStats  flowId="3" packets="0" bytes="0" delayFromFirstProbeSum="+0.0ns" />
    </FlowProbe>
  </FlowProbes>
</FlowMonitor>
"#
        )
    }

    fn write_trace(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn test_decode_ns3_trace() {
        let xml = format!("<?xml version=\"1.0\" ?>\n{}", flow_monitor(150000));
        let sims: Vec<_> = TraceReader::new(xml.as_bytes(), DEFAULT_TRACE_TAG)
            .simulations(LinkModel::default())
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(sims.len(), 1);
        let sim = &sims[0];
        assert_eq!(sim.len(), 3);

        let data = sim.flow(1).unwrap();
        assert_eq!(data.five_tuple().unwrap().source_port, 49153);
        assert_eq!(data.hop_count, 3.0);
        assert_eq!(data.start, 1.0);
        assert!((data.raw_duration - 0.00101).abs() < 1e-12);
        assert!((data.delay_mean.unwrap() - 1e-5).abs() < 1e-15);
        assert!((data.tx_bitrate.unwrap() - 1.2e9).abs() < 1e-3);
        assert!(data.flow_interruptions_histogram.as_ref().unwrap().bins.is_empty());
        let probe_order: Vec<u32> = data.probe_stats_unsorted().iter().map(|s| s.probe_id).collect();
        assert_eq!(probe_order, vec![1, 0]);
        assert!((data.probe_stats_sorted()[1].delay_from_first_probe - 5e-6).abs() < 1e-15);

        let lost = sim.flow(3).unwrap();
        assert_eq!(lost.delay_mean, None);
        assert_eq!(lost.packet_loss_ratio, None);
        assert_eq!(lost.hop_count, HOP_COUNT_UNKNOWN);
        assert_eq!(lost.tx_bitrate, None);
        assert_eq!(lost.rx_bitrate, None);

        // Probe totals never exceed what each flow received
        for flow in sim.flows() {
            assert!(flow.five_tuple().is_some());
            let max_bytes = flow.probe_stats_unsorted().iter().map(|s| s.bytes).max().unwrap_or(0);
            assert!(max_bytes <= flow.size);
        }
    }

    #[test]
    fn test_batched_runs_in_one_file() {
        let dir = TempDir::new().unwrap();
        let content = format!("{}{}{}", flow_monitor(1000), flow_monitor(2000), flow_monitor(3000));
        write_trace(dir.path(), "incast_dctcp_s4.xml", &content);

        let sims = trace::load_trace_file(&dir.path().join("incast_dctcp_s4.xml"), DEFAULT_TRACE_TAG, &LinkModel::default()).unwrap();
        let sizes: Vec<u64> = sims.iter().map(|s| s.flow(1).unwrap().size).collect();
        assert_eq!(sizes, vec![1000, 2000, 3000]);
    }

    #[test]
    fn test_batch_groups_by_scheme_and_senders() {
        let dir = TempDir::new().unwrap();
        write_trace(dir.path(), "incast_dctcp_s4.xml", &flow_monitor(4000));
        write_trace(dir.path(), "incast_dctcp_s2.xml", &flow_monitor(2000));
        write_trace(dir.path(), "incast_a10_s2.xml", &flow_monitor(1000));
        write_trace(dir.path(), "notes.txt", "not a trace");

        let options = BatchOptions::from(&AnalysisConfig::default());
        let batch = analysis::load_batch(dir.path(), &options).unwrap();
        assert_eq!(batch.files_processed, 3);
        assert!(batch.skipped.is_empty());
        assert_eq!(batch.total_flows(), 9);

        // ACK flow (source port 9) and the undelivered flow are dropped
        assert_eq!(batch.groups.get(&Scheme::Dctcp, 2), Some(&[2000.0][..]));
        assert_eq!(batch.groups.get(&Scheme::Dctcp, 4), Some(&[4000.0][..]));
        let pbs = Scheme::Pbs { alpha: "10".to_string() };
        assert_eq!(batch.groups.get(&pbs, 2), Some(&[1000.0][..]));
    }

    #[test]
    fn test_malformed_file_is_skipped() {
        let dir = TempDir::new().unwrap();
        write_trace(dir.path(), "incast_dctcp_s2.xml", &flow_monitor(2000));
        // Classifier references a flow missing from FlowStats
        let orphan = flow_monitor(1000).replace(
            "</Ipv4FlowClassifier>",
            r#"<Flow flowId="7" sourceAddress="10.0.0.9" destinationAddress="10.0.1.2" protocol="6" sourcePort="1" destinationPort="9" /></Ipv4FlowClassifier>"#,
        );
        write_trace(dir.path(), "incast_dctcp_s8.xml", &orphan);
        write_trace(dir.path(), "incast_dctcp_s16.xml", &flow_monitor(1000).replace("+1000000.0ns", "1000us"));
        write_trace(dir.path(), "badname.xml", &flow_monitor(1000));

        let options = BatchOptions::from(&AnalysisConfig::default());
        let batch = analysis::load_batch(dir.path(), &options).unwrap();
        assert_eq!(batch.files_processed, 1);
        assert_eq!(batch.skipped.len(), 3);

        let reasons: Vec<&str> = batch.skipped.iter().map(|s| s.reason.as_str()).collect();
        assert!(reasons.iter().any(|r| r.contains("flow 7")));
        assert!(reasons.iter().any(|r| r.contains("1000us")));
        assert!(reasons.iter().any(|r| r.contains("badname.xml")));
        assert!(batch.groups.get(&Scheme::Dctcp, 2).is_some());
    }

    #[test]
    fn test_skip_reason_names_failing_flow() {
        let dir = TempDir::new().unwrap();
        let bad = flow_monitor(1000)
            .replace(r#"flowId="1""#, r#"flowId="42""#)
            .replace(r#"txBytes="1000""#, r#"txBytes="x""#);
        write_trace(dir.path(), "incast_dctcp_s4.xml", &bad);

        let options = BatchOptions::from(&AnalysisConfig::default());
        let batch = analysis::load_batch(dir.path(), &options).unwrap();
        assert_eq!(batch.files_processed, 0);
        let reason = &batch.skipped[0].reason;
        assert!(reason.contains("incast_dctcp_s4.xml"));
        assert!(reason.contains("FlowStats record of flow 42"));
        assert!(reason.contains("txBytes"));
        assert_eq!(batch.skipped[0].flow_id, Some(42));

        let err = trace::load_trace_file(&dir.path().join("incast_dctcp_s4.xml"), DEFAULT_TRACE_TAG, &LinkModel::default())
            .unwrap_err();
        assert_eq!(err.flow_id(), Some(42));
    }

    #[test]
    fn test_join_error_is_typed() {
        let orphan = flow_monitor(1000).replace(
            r#"<FlowStats  flowId="2" packets="50""#,
            r#"<FlowStats  flowId="9" packets="50""#,
        );
        let result: Result<Vec<_>, TraceError> = TraceReader::new(orphan.as_bytes(), DEFAULT_TRACE_TAG)
            .simulations(LinkModel::default())
            .collect();
        match result {
            Err(TraceError::JoinIntegrity { section, flow_id }) => {
                assert_eq!(section, "FlowProbes");
                assert_eq!(flow_id, 9);
            }
            other => panic!("expected join error, got {other:?}"),
        }
    }

    #[test]
    fn test_report_files_for_selected_metric() {
        let dir = TempDir::new().unwrap();
        write_trace(dir.path(), "incast_dctcp_s2.xml", &flow_monitor(2000));

        let config = AnalysisConfig {
            metric: Metric::Slowdown,
            exclude_ports: vec![],
            ..AnalysisConfig::default()
        };
        let options = BatchOptions::from(&config);
        let batch = analysis::load_batch(dir.path(), &options).unwrap();
        assert_eq!(batch.groups.get(&Scheme::Dctcp, 2).unwrap().len(), 2);

        let report = analysis::build_report(&batch, &options, dir.path());
        let out = dir.path().join("slowdown_report.json");
        analysis::generate_json_report(&report, &out).unwrap();
        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(value["metadata"]["metric"], "slowdown");
        assert_eq!(value["schemes"][0]["rows"][0]["samples"], 2);
    }
}
